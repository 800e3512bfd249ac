//! # KPI Core
//!
//! 质量指标看板的核心模块，提供基础数据结构、错误定义、统计周期换算和通用工具。

pub mod error;
pub mod models;
pub mod period;
pub mod utils;

pub use error::{KpiError, PeriodKind, Result};
pub use models::*;
pub use period::{month_to_quarter, quarter_to_months, Quarter};
