//! 指标数据快照
//!
//! 数据层按科室/年份导出的只读数据，JSON 格式。

use kpi_aggregation::AggregationInput;
use kpi_core::{Category, Department, Indicator, KpiError, MonthlyDatum, PatientCase, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// 指标数据快照
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiDataset {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub indicators: Vec<Indicator>,
    #[serde(default)]
    pub monthly_data: Vec<MonthlyDatum>,
    #[serde(default)]
    pub patient_cases: Vec<PatientCase>,
}

impl KpiDataset {
    /// 从 JSON 文件读取快照
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let dataset: KpiDataset = serde_json::from_slice(&bytes)?;

        info!(
            "Loaded dataset {}: {} departments, {} categories, {} indicators, {} monthly rows, {} patient cases",
            path.display(),
            dataset.departments.len(),
            dataset.categories.len(),
            dataset.indicators.len(),
            dataset.monthly_data.len(),
            dataset.patient_cases.len()
        );
        Ok(dataset)
    }

    /// 聚合引擎输入
    pub fn as_input(&self) -> AggregationInput<'_> {
        AggregationInput {
            indicators: &self.indicators,
            categories: &self.categories,
            monthly_data: &self.monthly_data,
            patient_cases: &self.patient_cases,
        }
    }

    /// 查找科室
    pub fn department(&self, department_id: Uuid) -> Result<&Department> {
        self.departments
            .iter()
            .find(|d| d.id == department_id)
            .ok_or_else(|| KpiError::NotFound(format!("科室不存在: {}", department_id)))
    }

    /// 分类ID，保持快照中的顺序
    pub fn category_ids(&self) -> Vec<Uuid> {
        self.categories.iter().map(|c| c.id).collect()
    }

    /// 指标ID，保持快照中的顺序
    pub fn indicator_ids(&self) -> Vec<Uuid> {
        self.indicators.iter().map(|i| i.id).collect()
    }
}
