//! 配置管理
//!
//! TOML 配置文件 + `KPI__` 前缀环境变量覆盖，支持校验和写回

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use kpi_color::{PaletteRegistry, DEFAULT_PALETTE_ID};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: Arc<RwLock<KpiConfig>>,
    /// 配置文件路径
    config_path: PathBuf,
    /// 配置验证器
    validator: ConfigValidator,
}

/// 看板完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiConfig {
    /// 看板配置
    pub dashboard: DashboardConfig,
    /// 配色配置
    pub colors: ColorsConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 看板配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// 当前选用的调色板
    pub default_palette: String,
    /// 默认统计年份
    pub fiscal_year: Option<i32>,
}

/// 配色配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// 配色映射文件
    pub store_path: PathBuf,
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 日志格式
    pub format: LogFormat,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_palette: DEFAULT_PALETTE_ID.to_string(),
            fiscal_year: None,
        }
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("./data/color_mapping.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&KpiConfig) -> Result<()>,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ConfigManager {
    /// 创建新的配置管理器，配置文件不存在时使用默认值
    pub fn new(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let config = Self::load_config(&config_path)?;
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
            validator,
        })
    }

    /// 从文件和环境变量加载配置
    fn load_config(config_path: &Path) -> Result<KpiConfig> {
        let settings = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("KPI").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: KpiConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        info!("Configuration loaded from: {}", config_path.display());
        Ok(config)
    }

    /// 获取配置
    pub async fn get_config(&self) -> KpiConfig {
        let config = self.config.read().await;
        config.clone()
    }

    /// 更新配置
    pub async fn update_config(&self, new_config: KpiConfig) -> Result<()> {
        self.validator.validate(&new_config)?;

        {
            let mut config = self.config.write().await;
            *config = new_config;
        }

        self.save_config().await?;

        info!("Configuration updated successfully");
        Ok(())
    }

    /// 切换看板调色板并写回
    pub async fn set_default_palette(&self, palette_id: &str) -> Result<()> {
        let mut config = self.get_config().await;
        config.dashboard.default_palette = palette_id.to_string();
        self.update_config(config).await
    }

    /// 保存配置到文件
    async fn save_config(&self) -> Result<()> {
        let config = self.config.read().await;
        let config_str =
            toml::to_string_pretty(&*config).context("Failed to serialize configuration")?;

        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("Failed to create configuration directory")?;
            }
        }
        tokio::fs::write(&self.config_path, config_str)
            .await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {}", self.config_path.display());
        Ok(())
    }
}

impl ConfigValidator {
    /// 创建新的配置验证器
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "dashboard.default_palette",
                validator: |config| {
                    let id = &config.dashboard.default_palette;
                    if PaletteRegistry::global().contains(id) {
                        Ok(())
                    } else {
                        Err(anyhow::anyhow!("Unknown palette: {}", id))
                    }
                },
            },
            ValidationRule {
                field_path: "colors.store_path",
                validator: |config| {
                    if config.colors.store_path.as_os_str().is_empty() {
                        Err(anyhow::anyhow!("Color store path cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| {
                    let level = config.logging.level.to_lowercase();
                    if LOG_LEVELS.contains(&level.as_str()) {
                        Ok(())
                    } else {
                        Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level))
                    }
                },
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &KpiConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(e.context(format!("Invalid configuration field {}", rule.field_path)));
            }
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("kpi.toml")).unwrap();
        let config = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(manager.get_config());
        assert_eq!(config, KpiConfig::default());
        assert_eq!(config.dashboard.default_palette, DEFAULT_PALETTE_ID);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kpi.toml");
        std::fs::write(
            &path,
            r#"
[dashboard]
default_palette = "okabe-ito"
fiscal_year = 2026

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let manager = ConfigManager::new(&path).unwrap();
        let config = tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(manager.get_config());
        assert_eq!(config.dashboard.default_palette, "okabe-ito");
        assert_eq!(config.dashboard.fiscal_year, Some(2026));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.colors, ColorsConfig::default());
    }

    #[test]
    fn test_unknown_palette_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kpi.toml");
        std::fs::write(&path, "[dashboard]\ndefault_palette = \"nonexistent\"\n").unwrap();
        assert!(ConfigManager::new(&path).is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = KpiConfig::default();
        config.logging.level = "loud".to_string();
        assert!(ConfigValidator::new().validate(&config).is_err());

        config.logging.level = "WARN".to_string();
        assert!(ConfigValidator::new().validate(&config).is_ok());
    }

    #[tokio::test]
    async fn test_set_default_palette_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("kpi.toml");
        let manager = ConfigManager::new(&path).unwrap();

        manager.set_default_palette("pastel").await.unwrap();
        assert!(manager.set_default_palette("nonexistent").await.is_err());

        let reloaded = ConfigManager::new(&path).unwrap();
        assert_eq!(reloaded.get_config().await.dashboard.default_palette, "pastel");
    }
}
