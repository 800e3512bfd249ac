//! 看板报表组装
//!
//! 把聚合结果与稳定配色合并成图表层直接使用的结构。

use kpi_aggregation::{AggregationResult, IntegrityWarning, ValueSource, YearOverview};
use kpi_color::{BatchAssignment, ColorMapper, ColorStore};
use kpi_core::{Department, EntityType, Quarter};
use kpi_storage::KpiDataset;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 看板报表
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub department: DepartmentSummary,
    pub year: i32,
    pub palette: String,
    pub quarters: Vec<QuarterReport>,
    /// 全年合计，仅全年报表填写
    pub year_total: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DepartmentSummary {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub read_only: bool,
}

#[derive(Debug, Serialize)]
pub struct QuarterReport {
    pub quarter: Quarter,
    pub months: [u32; 3],
    pub categories: Vec<CategoryRow>,
    /// 分类缺失的指标，仍计入总计
    pub unassigned_indicators: Vec<IndicatorRow>,
    pub grand_total: f64,
    pub integrity_warnings: Vec<IntegrityWarning>,
}

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub total: f64,
    pub indicators: Vec<IndicatorRow>,
}

#[derive(Debug, Serialize)]
pub struct IndicatorRow {
    pub id: Uuid,
    pub name: String,
    pub unit: Option<String>,
    pub color: Option<String>,
    pub source: ValueSource,
    pub per_month: BTreeMap<u32, f64>,
    pub total: f64,
}

/// 实体颜色查询
#[derive(Debug, Default)]
pub struct ReportColors {
    pub categories: BatchAssignment,
    pub indicators: BatchAssignment,
}

impl ReportColors {
    /// 为快照中的分类和指标分配颜色，`reset` 时先按调色板整体重排
    pub fn assign<S>(
        mapper: &ColorMapper<'_>,
        dataset: &KpiDataset,
        palette: &str,
        reset: bool,
        store: &mut S,
    ) -> Self
    where
        S: ColorStore + ?Sized,
    {
        let categories = dataset.category_ids();
        let indicators = dataset.indicator_ids();

        if reset {
            mapper.apply_reset(&categories, EntityType::Category, palette, store);
            mapper.apply_reset(&indicators, EntityType::Indicator, palette, store);
        }

        Self {
            categories: mapper.build_mapping(&categories, EntityType::Category, palette, store),
            indicators: mapper.build_mapping(&indicators, EntityType::Indicator, palette, store),
        }
    }
}

impl DepartmentSummary {
    pub fn from_department(department: &Department) -> Self {
        Self {
            id: department.id,
            name: department.name.clone(),
            color: department.color.clone(),
            read_only: department.is_read_only(),
        }
    }
}

/// 组装单个季度，分类与指标保持快照中的顺序
pub fn build_quarter_report(
    dataset: &KpiDataset,
    result: &AggregationResult,
    colors: &ReportColors,
) -> QuarterReport {
    let indicator_row = |indicator: &kpi_core::Indicator| {
        result.per_indicator.get(&indicator.id).map(|total| IndicatorRow {
            id: indicator.id,
            name: indicator.name.clone(),
            unit: indicator.unit.clone(),
            color: colors.indicators.color_of(indicator.id).map(str::to_string),
            source: total.source,
            per_month: total.per_month.clone(),
            total: total.quarter_total,
        })
    };

    let categories = dataset
        .categories
        .iter()
        .map(|category| CategoryRow {
            id: category.id,
            name: category.name.clone(),
            color: colors.categories.color_of(category.id).map(str::to_string),
            total: result.category_total(category.id).unwrap_or(0.0),
            indicators: dataset
                .indicators
                .iter()
                .filter(|indicator| indicator.category_id == category.id)
                .filter_map(indicator_row)
                .collect(),
        })
        .collect();

    let unassigned_indicators = result
        .integrity_warnings
        .iter()
        .filter_map(|warning| match warning {
            IntegrityWarning::MissingCategory { indicator_id, .. } => dataset
                .indicators
                .iter()
                .find(|indicator| indicator.id == *indicator_id),
        })
        .filter_map(indicator_row)
        .collect();

    QuarterReport {
        quarter: result.quarter,
        months: result.quarter.months(),
        categories,
        unassigned_indicators,
        grand_total: result.grand_total,
        integrity_warnings: result.integrity_warnings.clone(),
    }
}

/// 组装季度报表
pub fn build_report(
    department: &Department,
    dataset: &KpiDataset,
    palette: &str,
    result: &AggregationResult,
    colors: &ReportColors,
) -> DashboardReport {
    DashboardReport {
        department: DepartmentSummary::from_department(department),
        year: result.year,
        palette: palette.to_string(),
        quarters: vec![build_quarter_report(dataset, result, colors)],
        year_total: None,
    }
}

/// 组装全年报表
pub fn build_year_report(
    department: &Department,
    dataset: &KpiDataset,
    palette: &str,
    overview: &YearOverview,
    colors: &ReportColors,
) -> DashboardReport {
    DashboardReport {
        department: DepartmentSummary::from_department(department),
        year: overview.year,
        palette: palette.to_string(),
        quarters: overview
            .quarters
            .iter()
            .map(|result| build_quarter_report(dataset, result, colors))
            .collect(),
        year_total: Some(overview.grand_total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpi_aggregation::{aggregate, aggregate_year};
    use kpi_color::{ColorMapper, ColorMapping, PaletteRegistry, DEFAULT_PALETTE_ID};
    use kpi_core::{Category, Indicator, MonthlyDatum, PatientCase};
    use kpi_storage::FileColorStore;

    fn dataset() -> (KpiDataset, Uuid) {
        let department = Department {
            id: Uuid::new_v4(),
            name: "护理部".to_string(),
            description: None,
            color: "#4e79a7".to_string(),
            is_frozen: Some(true),
            created_at: None,
        };
        let safety = Category {
            id: Uuid::new_v4(),
            name: "患者安全".to_string(),
            requires_patient_info: true,
        };
        let empty = Category {
            id: Uuid::new_v4(),
            name: "院感防控".to_string(),
            requires_patient_info: false,
        };
        let falls = Indicator {
            id: Uuid::new_v4(),
            category_id: safety.id,
            name: "Fall Incidents".to_string(),
            unit: Some("例".to_string()),
            requires_patient_info: None,
        };
        let rdu = Indicator {
            id: Uuid::new_v4(),
            category_id: safety.id,
            name: "RDU Sessions".to_string(),
            unit: Some("次".to_string()),
            requires_patient_info: Some(false),
        };
        let orphan = Indicator {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: "孤立指标".to_string(),
            unit: None,
            requires_patient_info: Some(false),
        };

        let dept = department.id;
        let monthly_data = ["5", "3", "2"]
            .iter()
            .enumerate()
            .map(|(i, value)| MonthlyDatum {
                department_id: dept,
                indicator_id: rdu.id,
                year: 2026,
                month: i as u32 + 1,
                value: Some(value.to_string()),
                note: None,
            })
            .chain(std::iter::once(MonthlyDatum {
                department_id: dept,
                indicator_id: orphan.id,
                year: 2026,
                month: 2,
                value: Some("1".to_string()),
                note: None,
            }))
            .collect();
        let patient_cases = (0..3)
            .map(|n| PatientCase {
                id: Uuid::new_v4(),
                department_id: dept,
                indicator_id: falls.id,
                year: 2026,
                month: 1,
                patient_hospital_id: format!("ZY{:04}", n),
                patient_name: "王五".to_string(),
                notes: None,
            })
            .collect();

        let dataset = KpiDataset {
            departments: vec![department],
            categories: vec![safety, empty],
            indicators: vec![falls, rdu, orphan],
            monthly_data,
            patient_cases,
        };
        (dataset, dept)
    }

    fn colors(dataset: &KpiDataset, store: &mut ColorMapping) -> ReportColors {
        let mapper = ColorMapper::with_builtin_palettes();
        ReportColors::assign(&mapper, dataset, DEFAULT_PALETTE_ID, false, store)
    }

    #[test]
    fn test_quarter_report() {
        let (dataset, dept) = dataset();
        let mut store = ColorMapping::new();
        let colors = colors(&dataset, &mut store);
        let result = aggregate(dept, 2026, 1, &dataset.as_input()).unwrap();
        let department = dataset.department(dept).unwrap();

        let report = build_report(department, &dataset, DEFAULT_PALETTE_ID, &result, &colors);
        assert!(report.department.read_only);
        assert_eq!(report.quarters.len(), 1);

        let quarter = &report.quarters[0];
        assert_eq!(quarter.months, [1, 2, 3]);
        assert_eq!(quarter.grand_total, 14.0);
        assert_eq!(quarter.categories.len(), 2);

        let safety = &quarter.categories[0];
        assert_eq!(safety.total, 13.0);
        assert_eq!(safety.indicators.len(), 2);
        assert_eq!(safety.indicators[0].total, 3.0);
        assert_eq!(safety.indicators[0].source, ValueSource::Counted);
        assert_eq!(safety.indicators[1].total, 10.0);

        let palette = PaletteRegistry::global().default_palette();
        assert_eq!(safety.color.as_deref(), Some(palette.colors[0]));
        assert_eq!(quarter.categories[1].color.as_deref(), Some(palette.colors[1]));
        assert_eq!(safety.indicators[1].color.as_deref(), Some(palette.colors[1]));

        assert_eq!(quarter.categories[1].total, 0.0);
        assert!(quarter.categories[1].indicators.is_empty());
        assert_eq!(quarter.unassigned_indicators.len(), 1);
        assert_eq!(quarter.unassigned_indicators[0].total, 1.0);
        assert_eq!(quarter.integrity_warnings.len(), 1);
    }

    #[test]
    fn test_year_report() {
        let (dataset, dept) = dataset();
        let mut store = ColorMapping::new();
        let colors = colors(&dataset, &mut store);
        let overview = aggregate_year(dept, 2026, &dataset.as_input()).unwrap();
        let department = dataset.department(dept).unwrap();

        let report = build_year_report(department, &dataset, "corporate", &overview, &colors);
        assert_eq!(report.quarters.len(), 4);
        assert_eq!(report.year_total, Some(14.0));
        assert_eq!(report.palette, "corporate");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["quarters"][3]["months"], serde_json::json!([10, 11, 12]));
    }

    #[tokio::test]
    async fn test_reset_colors_survive_reopen() {
        let (dataset, _) = dataset();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colors.json");
        let mapper = ColorMapper::with_builtin_palettes();

        let mut store = FileColorStore::open(&path).await.unwrap();
        ReportColors::assign(&mapper, &dataset, DEFAULT_PALETTE_ID, false, &mut store);
        store.flush().await.unwrap();

        let mut store = FileColorStore::open(&path).await.unwrap();
        let reset = ReportColors::assign(&mapper, &dataset, "okabe-ito", true, &mut store);
        assert!(store.flush().await.unwrap());

        let okabe = PaletteRegistry::global().get("okabe-ito").unwrap();
        let first_category = dataset.categories[0].id;
        let first_indicator = dataset.indicators[0].id;
        assert_eq!(reset.categories.color_of(first_category), Some(okabe.colors[0]));

        // 下一次运行不带 reset，读到的仍是重排后的颜色
        let mut reopened = FileColorStore::open(&path).await.unwrap();
        let again = ReportColors::assign(&mapper, &dataset, "okabe-ito", false, &mut reopened);
        assert_eq!(again.categories.color_of(first_category), Some("#e69f00"));
        assert_eq!(again.indicators.color_of(first_indicator), Some("#e69f00"));
        assert!(!reopened.is_dirty());
    }
}
