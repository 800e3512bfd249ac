//! # KPI聚合模块
//!
//! 将两类独立数据源合并为统一的指标统计：
//! - 数值填报：月度数值直接求和
//! - 患者病例：按病例行数计数
//!
//! 并按季度、分类、全年逐级汇总。

pub mod engine;
pub mod value_source;

// 重新导出主要类型
pub use engine::{
    aggregate, aggregate_year, AggregationInput, AggregationResult, IndicatorTotal,
    IntegrityWarning, YearOverview,
};
pub use value_source::{IndicatorSource, ValueLookup, ValueSource};
