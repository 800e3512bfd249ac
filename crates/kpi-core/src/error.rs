//! 错误定义模块

use std::fmt;
use thiserror::Error;

/// 无效周期的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Quarter,
    Month,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKind::Quarter => write!(f, "季度"),
            PeriodKind::Month => write!(f, "月份"),
        }
    }
}

/// 指标系统统一错误类型
#[derive(Error, Debug)]
pub enum KpiError {
    #[error("无效周期: {kind} {value}")]
    InvalidPeriod { kind: PeriodKind, value: u32 },

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),
}

impl KpiError {
    /// 是否为周期越界错误
    pub fn is_invalid_period(&self) -> bool {
        matches!(self, KpiError::InvalidPeriod { .. })
    }
}

/// 指标系统统一结果类型
pub type Result<T> = std::result::Result<T, KpiError>;
