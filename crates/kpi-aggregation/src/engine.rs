//! 聚合引擎
//!
//! 按季度汇总每个指标的月度计数，再逐级汇总到分类与科室总计。

use crate::value_source::{IndicatorSource, ValueLookup, ValueSource};
use kpi_core::{Category, Indicator, MonthlyDatum, PatientCase, Quarter, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};
use uuid::Uuid;

/// 聚合输入，由数据层按科室/年份读出
#[derive(Debug, Clone, Copy)]
pub struct AggregationInput<'a> {
    pub indicators: &'a [Indicator],
    pub categories: &'a [Category],
    pub monthly_data: &'a [MonthlyDatum],
    pub patient_cases: &'a [PatientCase],
}

/// 单个指标的季度统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorTotal {
    pub source: ValueSource,
    pub per_month: BTreeMap<u32, f64>,
    pub quarter_total: f64,
}

/// 数据完整性告警，不中断聚合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    /// 指标引用了不存在的分类
    MissingCategory { indicator_id: Uuid, category_id: Uuid },
}

/// 季度聚合结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResult {
    pub department_id: Uuid,
    pub year: i32,
    pub quarter: Quarter,
    pub per_indicator: HashMap<Uuid, IndicatorTotal>,
    pub per_category: HashMap<Uuid, f64>,
    pub grand_total: f64,
    pub integrity_warnings: Vec<IntegrityWarning>,
}

impl AggregationResult {
    /// 指标季度合计，未知指标返回 `None`
    pub fn indicator_total(&self, indicator_id: Uuid) -> Option<f64> {
        self.per_indicator.get(&indicator_id).map(|t| t.quarter_total)
    }

    /// 分类季度合计，未知分类返回 `None`
    pub fn category_total(&self, category_id: Uuid) -> Option<f64> {
        self.per_category.get(&category_id).copied()
    }

    pub fn has_integrity_warnings(&self) -> bool {
        !self.integrity_warnings.is_empty()
    }
}

/// 全年概览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearOverview {
    pub department_id: Uuid,
    pub year: i32,
    pub quarters: Vec<AggregationResult>,
    pub per_indicator: HashMap<Uuid, f64>,
    pub per_category: HashMap<Uuid, f64>,
    pub grand_total: f64,
}

/// 按季度聚合一个科室的全部指标
pub fn aggregate(
    department_id: Uuid,
    year: i32,
    quarter: u32,
    input: &AggregationInput<'_>,
) -> Result<AggregationResult> {
    let quarter = Quarter::new(quarter)?;
    let months = quarter.months();

    let categories: HashMap<Uuid, &Category> =
        input.categories.iter().map(|c| (c.id, c)).collect();
    let lookup = ValueLookup::build(
        department_id,
        year,
        &months,
        input.monthly_data,
        input.patient_cases,
    );

    let mut per_indicator = HashMap::with_capacity(input.indicators.len());
    let mut per_category: HashMap<Uuid, f64> =
        input.categories.iter().map(|c| (c.id, 0.0)).collect();
    let mut integrity_warnings = Vec::new();
    let mut grand_total = 0.0;

    for indicator in input.indicators {
        let category = categories.get(&indicator.category_id).copied();
        let descriptor = IndicatorSource {
            indicator_id: indicator.id,
            source: ValueSource::resolve(indicator, category),
        };

        let per_month: BTreeMap<u32, f64> = months
            .iter()
            .map(|&month| (month, lookup.value_for(&descriptor, month)))
            .collect();
        let quarter_total: f64 = per_month.values().sum();

        match category {
            Some(category) => {
                *per_category.entry(category.id).or_insert(0.0) += quarter_total;
            }
            None => {
                warn!(
                    "Indicator {} ({}) references missing category {}",
                    indicator.id, indicator.name, indicator.category_id
                );
                integrity_warnings.push(IntegrityWarning::MissingCategory {
                    indicator_id: indicator.id,
                    category_id: indicator.category_id,
                });
            }
        }

        grand_total += quarter_total;
        per_indicator.insert(
            indicator.id,
            IndicatorTotal {
                source: descriptor.source,
                per_month,
                quarter_total,
            },
        );
    }

    info!(
        "Aggregated {} indicators for department {} {} {}: total {}",
        per_indicator.len(),
        department_id,
        year,
        quarter,
        grand_total
    );

    Ok(AggregationResult {
        department_id,
        year,
        quarter,
        per_indicator,
        per_category,
        grand_total,
        integrity_warnings,
    })
}

/// 汇总全年四个季度
pub fn aggregate_year(
    department_id: Uuid,
    year: i32,
    input: &AggregationInput<'_>,
) -> Result<YearOverview> {
    let quarters = Quarter::ALL
        .iter()
        .map(|q| aggregate(department_id, year, q.number(), input))
        .collect::<Result<Vec<_>>>()?;

    let mut per_indicator: HashMap<Uuid, f64> = HashMap::new();
    let mut per_category: HashMap<Uuid, f64> = HashMap::new();
    for result in &quarters {
        for (id, total) in &result.per_indicator {
            *per_indicator.entry(*id).or_insert(0.0) += total.quarter_total;
        }
        for (id, total) in &result.per_category {
            *per_category.entry(*id).or_insert(0.0) += total;
        }
    }
    let grand_total = quarters.iter().map(|q| q.grand_total).sum();

    Ok(YearOverview {
        department_id,
        year,
        quarters,
        per_indicator,
        per_category,
        grand_total,
    })
}
