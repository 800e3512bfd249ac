//! 数据源适配
//!
//! 把月度数值填报和患者病例两种记录统一成 `(指标, 月份) -> 计数` 查询。

use kpi_core::{utils::parse_numeric, Category, Indicator, MonthlyDatum, PatientCase};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// 指标取值方式，每个指标只解析一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// 统计患者病例行数
    Counted,
    /// 取月度数值填报
    Summed,
}

impl ValueSource {
    /// 根据指标及其分类的患者信息标记确定取值方式
    pub fn resolve(indicator: &Indicator, category: Option<&Category>) -> Self {
        if indicator.effective_requires_patient_info(category) {
            ValueSource::Counted
        } else {
            ValueSource::Summed
        }
    }
}

/// 指标描述：标识 + 已解析的取值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSource {
    pub indicator_id: Uuid,
    pub source: ValueSource,
}

/// 某科室某年若干月份的统一取值表
#[derive(Debug, Default)]
pub struct ValueLookup {
    summed: HashMap<(Uuid, u32), f64>,
    counted: HashMap<(Uuid, u32), usize>,
}

impl ValueLookup {
    /// 从原始记录构建查询表，只保留指定科室、年份和月份的行
    pub fn build(
        department_id: Uuid,
        year: i32,
        months: &[u32],
        monthly_data: &[MonthlyDatum],
        patient_cases: &[PatientCase],
    ) -> Self {
        let in_scope = |dept: Uuid, y: i32, month: u32| {
            dept == department_id && y == year && months.contains(&month)
        };

        let mut lookup = Self::default();

        for datum in monthly_data {
            if !in_scope(datum.department_id, datum.year, datum.month) {
                continue;
            }
            let value = match datum.value.as_deref() {
                Some(raw) => parse_numeric(raw).unwrap_or_else(|| {
                    debug!(
                        "Unparseable value {:?} for indicator {} month {}, treated as 0",
                        raw, datum.indicator_id, datum.month
                    );
                    0.0
                }),
                None => 0.0,
            };
            lookup.summed.insert((datum.indicator_id, datum.month), value);
        }

        for case in patient_cases {
            if !in_scope(case.department_id, case.year, case.month) {
                continue;
            }
            *lookup
                .counted
                .entry((case.indicator_id, case.month))
                .or_insert(0) += 1;
        }

        lookup
    }

    /// 获取指标某月的计数，无记录时为 0
    pub fn value_for(&self, indicator: &IndicatorSource, month: u32) -> f64 {
        let key = (indicator.indicator_id, month);
        match indicator.source {
            ValueSource::Counted => self.counted.get(&key).copied().unwrap_or(0) as f64,
            ValueSource::Summed => self.summed.get(&key).copied().unwrap_or(0.0),
        }
    }
}
