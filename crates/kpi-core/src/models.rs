//! 核心数据模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 科室
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String, // 科室展示色
    #[serde(default)]
    pub is_frozen: Option<bool>, // 冻结后只读
    pub created_at: Option<DateTime<Utc>>,
}

impl Department {
    /// 科室是否处于只读状态
    pub fn is_read_only(&self) -> bool {
        self.is_frozen.unwrap_or(false)
    }
}

/// 指标分类，所有科室共享
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub requires_patient_info: bool, // 下属指标默认按患者病例计数
}

/// 质量指标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub unit: Option<String>,
    #[serde(default)]
    pub requires_patient_info: Option<bool>, // 覆盖分类默认值
}

impl Indicator {
    /// 结合所属分类得出是否需要按患者病例计数
    ///
    /// 指标自身标记优先；未设置时沿用分类标记；分类缺失时按数值填报处理。
    pub fn effective_requires_patient_info(&self, category: Option<&Category>) -> bool {
        self.requires_patient_info
            .or_else(|| category.map(|c| c.requires_patient_info))
            .unwrap_or(false)
    }
}

/// 月度数值填报
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyDatum {
    pub department_id: Uuid,
    pub indicator_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub value: Option<String>, // 以文本存储，可能无法解析
    pub note: Option<String>,
}

/// 患者病例记录，每行计为一例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientCase {
    pub id: Uuid,
    pub department_id: Uuid,
    pub indicator_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub patient_hospital_id: String, // 住院号
    pub patient_name: String,
    pub notes: Option<String>,
}

/// 配色实体类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Indicator,
    Category,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Indicator => "indicator",
            EntityType::Category => "category",
        }
    }

    /// 配色映射表中的键，形如 `indicator-<id>`
    pub fn mapping_key(&self, entity_id: Uuid) -> String {
        format!("{}-{}", self.as_str(), entity_id)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
