//! 调色板注册表
//!
//! 静态配置数据，按声明顺序维护，不支持运行时修改。

use kpi_core::utils::is_valid_hex_color;
use kpi_core::KpiError;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// 默认调色板，未知调色板回退到此
pub const DEFAULT_PALETTE_ID: &str = "default";

/// 调色板分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteCategory {
    Professional,
    Vibrant,
    Pastel,
    Accessible,
}

impl PaletteCategory {
    pub const ALL: [Self; 4] = [
        Self::Professional,
        Self::Vibrant,
        Self::Pastel,
        Self::Accessible,
    ];

    /// 界面显示名称
    pub fn label(&self) -> &'static str {
        match self {
            Self::Professional => "专业",
            Self::Vibrant => "鲜艳",
            Self::Pastel => "柔和",
            Self::Accessible => "无障碍",
        }
    }
}

impl fmt::Display for PaletteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaletteCategory {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(Self::Professional),
            "vibrant" => Ok(Self::Vibrant),
            "pastel" => Ok(Self::Pastel),
            "accessible" => Ok(Self::Accessible),
            other => Err(KpiError::Validation(format!("未知调色板分类: {}", other))),
        }
    }
}

/// 命名调色板
#[derive(Debug, Clone, Serialize)]
pub struct Palette {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub colors: &'static [&'static str],
    pub category: PaletteCategory,
    pub accessible: bool,
}

impl Palette {
    /// 按位置循环取色，注册表保证颜色列表非空
    pub fn color_at(&self, index: usize) -> &'static str {
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// 内置调色板目录，第一项为默认调色板
static PALETTES: &[Palette] = &[
    Palette {
        id: DEFAULT_PALETTE_ID,
        name: "默认",
        description: "均衡的十色方案，适合大多数图表",
        colors: &[
            "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f",
            "#edc948", "#b07aa1", "#ff9da7", "#9c755f", "#bab0ac",
        ],
        category: PaletteCategory::Professional,
        accessible: false,
    },
    Palette {
        id: "corporate",
        name: "商务",
        description: "经典报表配色",
        colors: &[
            "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
            "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
        ],
        category: PaletteCategory::Professional,
        accessible: false,
    },
    Palette {
        id: "clinical",
        name: "临床",
        description: "以青绿色为主的医疗主题",
        colors: &[
            "#00838f", "#26a69a", "#5c6bc0", "#8d6e63",
            "#78909c", "#ab47bc", "#ef6c00", "#43a047",
        ],
        category: PaletteCategory::Professional,
        accessible: false,
    },
    Palette {
        id: "vibrant",
        name: "鲜艳",
        description: "高饱和度，区分度强",
        colors: &[
            "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231",
            "#911eb4", "#46f0f0", "#f032e6", "#bcf60c", "#fabebe",
        ],
        category: PaletteCategory::Vibrant,
        accessible: false,
    },
    Palette {
        id: "sunset",
        name: "日落",
        description: "暖色调为主",
        colors: &[
            "#ff6b6b", "#feca57", "#ff9f43", "#ee5253",
            "#f368e0", "#ff9ff3", "#48dbfb", "#0abde3",
        ],
        category: PaletteCategory::Vibrant,
        accessible: false,
    },
    Palette {
        id: "pastel",
        name: "马卡龙",
        description: "低饱和度浅色",
        colors: &[
            "#a8e6cf", "#dcedc1", "#ffd3b6", "#ffaaa5",
            "#ff8b94", "#b5ead7", "#c7ceea", "#e2f0cb",
        ],
        category: PaletteCategory::Pastel,
        accessible: false,
    },
    Palette {
        id: "soft",
        name: "柔和",
        description: "适合大面积填充",
        colors: &[
            "#fbb4ae", "#b3cde3", "#ccebc5", "#decbe4",
            "#fed9a6", "#ffffcc", "#e5d8bd", "#fddaec",
        ],
        category: PaletteCategory::Pastel,
        accessible: false,
    },
    Palette {
        id: "okabe-ito",
        name: "Okabe-Ito",
        description: "色觉障碍友好的八色方案",
        colors: &[
            "#e69f00", "#56b4e9", "#009e73", "#f0e442",
            "#0072b2", "#d55e00", "#cc79a7", "#000000",
        ],
        category: PaletteCategory::Accessible,
        accessible: true,
    },
    Palette {
        id: "ibm-colorblind",
        name: "IBM 色盲安全",
        description: "IBM Design 色盲安全五色",
        colors: &["#648fff", "#785ef0", "#dc267f", "#fe6100", "#ffb000"],
        category: PaletteCategory::Accessible,
        accessible: true,
    },
    Palette {
        id: "tol-bright",
        name: "Tol Bright",
        description: "Paul Tol 高对比方案",
        colors: &[
            "#4477aa", "#66ccee", "#228833", "#ccbb44",
            "#ee6677", "#aa3377", "#bbbbbb",
        ],
        category: PaletteCategory::Accessible,
        accessible: true,
    },
];

static REGISTRY: Lazy<PaletteRegistry> = Lazy::new(|| PaletteRegistry::new(PALETTES));

/// 调色板注册表
#[derive(Debug)]
pub struct PaletteRegistry {
    palettes: &'static [Palette],
    index: HashMap<&'static str, usize>,
}

impl PaletteRegistry {
    /// 以给定目录构建注册表，目录第一项作为回退调色板
    pub fn new(palettes: &'static [Palette]) -> Self {
        assert!(!palettes.is_empty(), "palette catalog must not be empty");
        assert!(
            palettes.iter().all(|palette| !palette.colors.is_empty()),
            "every palette must have at least one color"
        );
        let index = palettes
            .iter()
            .enumerate()
            .map(|(i, palette)| (palette.id, i))
            .collect();
        Self { palettes, index }
    }

    /// 内置目录
    pub fn global() -> &'static PaletteRegistry {
        &REGISTRY
    }

    /// 全部调色板，保持声明顺序
    pub fn all(&self) -> &[Palette] {
        self.palettes
    }

    pub fn get(&self, id: &str) -> Option<&Palette> {
        self.index.get(id).map(|&i| &self.palettes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn default_palette(&self) -> &Palette {
        &self.palettes[0]
    }

    /// 按ID获取调色板，未知ID回退到默认调色板
    pub fn get_or_default(&self, id: &str) -> &Palette {
        match self.get(id) {
            Some(palette) => palette,
            None => {
                let fallback = self.default_palette();
                warn!("Unknown palette '{}', falling back to '{}'", id, fallback.id);
                fallback
            }
        }
    }

    /// 按分类筛选
    pub fn by_category(&self, category: PaletteCategory) -> Vec<&Palette> {
        self.palettes
            .iter()
            .filter(|palette| palette.category == category)
            .collect()
    }

    /// 仅无障碍调色板
    pub fn accessible(&self) -> Vec<&Palette> {
        self.palettes.iter().filter(|palette| palette.accessible).collect()
    }

    /// 检查目录中所有颜色，返回格式不合法的 `(调色板ID, 颜色)`
    pub fn validate_catalog(&self) -> Vec<(&'static str, &'static str)> {
        self.palettes
            .iter()
            .flat_map(|palette| {
                palette
                    .colors
                    .iter()
                    .filter(|color| !is_valid_hex_color(color))
                    .map(move |color| (palette.id, *color))
            })
            .collect()
    }
}

impl Default for PaletteRegistry {
    fn default() -> Self {
        Self::new(PALETTES)
    }
}
