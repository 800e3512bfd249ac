//! 统计周期换算
//!
//! 季度与月份之间的双向映射，所有聚合与展示逻辑共用。

use crate::error::{KpiError, PeriodKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 每个季度包含的月数
pub const MONTHS_PER_QUARTER: u32 = 3;

/// 季度（1-4）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quarter(u32);

impl Quarter {
    /// 全年四个季度
    pub const ALL: [Quarter; 4] = [Quarter(1), Quarter(2), Quarter(3), Quarter(4)];

    /// 校验并创建季度
    pub fn new(quarter: u32) -> Result<Self> {
        if (1..=4).contains(&quarter) {
            Ok(Self(quarter))
        } else {
            Err(KpiError::InvalidPeriod {
                kind: PeriodKind::Quarter,
                value: quarter,
            })
        }
    }

    /// 月份所在季度
    pub fn of_month(month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(KpiError::InvalidPeriod {
                kind: PeriodKind::Month,
                value: month,
            });
        }
        Ok(Self(month.div_ceil(MONTHS_PER_QUARTER)))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// 季度内的三个连续月份
    pub fn months(self) -> [u32; 3] {
        let first = (self.0 - 1) * MONTHS_PER_QUARTER + 1;
        [first, first + 1, first + 2]
    }
}

impl TryFrom<u32> for Quarter {
    type Error = KpiError;

    fn try_from(value: u32) -> Result<Self> {
        Quarter::new(value)
    }
}

impl From<Quarter> for u32 {
    fn from(quarter: Quarter) -> Self {
        quarter.0
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

/// 季度 -> 月份
pub fn quarter_to_months(quarter: u32) -> Result<[u32; 3]> {
    Quarter::new(quarter).map(Quarter::months)
}

/// 月份 -> 季度
pub fn month_to_quarter(month: u32) -> Result<u32> {
    Quarter::of_month(month).map(Quarter::number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quarter_to_months() {
        assert_eq!(quarter_to_months(1).unwrap(), [1, 2, 3]);
        assert_eq!(quarter_to_months(2).unwrap(), [4, 5, 6]);
        assert_eq!(quarter_to_months(3).unwrap(), [7, 8, 9]);
        assert_eq!(quarter_to_months(4).unwrap(), [10, 11, 12]);
    }

    #[test]
    fn test_month_to_quarter() {
        assert_eq!(month_to_quarter(1).unwrap(), 1);
        assert_eq!(month_to_quarter(3).unwrap(), 1);
        assert_eq!(month_to_quarter(4).unwrap(), 2);
        assert_eq!(month_to_quarter(12).unwrap(), 4);
    }

    #[test]
    fn test_invalid_period() {
        let err = quarter_to_months(0).unwrap_err();
        assert!(matches!(
            err,
            KpiError::InvalidPeriod { kind: PeriodKind::Quarter, value: 0 }
        ));
        assert!(quarter_to_months(5).is_err());

        let err = month_to_quarter(13).unwrap_err();
        assert!(matches!(
            err,
            KpiError::InvalidPeriod { kind: PeriodKind::Month, value: 13 }
        ));
        assert!(month_to_quarter(0).unwrap_err().is_invalid_period());
    }

    #[test]
    fn test_quarter_serde() {
        let q: Quarter = serde_json::from_str("3").unwrap();
        assert_eq!(q.to_string(), "Q3");
        assert_eq!(serde_json::to_string(&q).unwrap(), "3");
        assert!(serde_json::from_str::<Quarter>("7").is_err());
    }

    proptest! {
        #[test]
        fn quarter_months_round_trip(q in 1u32..=4) {
            let months = quarter_to_months(q).unwrap();
            prop_assert_eq!(months[0], (q - 1) * 3 + 1);
            prop_assert_eq!(months[1], months[0] + 1);
            prop_assert_eq!(months[2], months[0] + 2);
            for month in months {
                prop_assert_eq!(month_to_quarter(month).unwrap(), q);
            }
        }

        #[test]
        fn out_of_range_month_rejected(m in 13u32..10_000) {
            prop_assert!(month_to_quarter(m).is_err());
        }
    }
}
