//! 指标看板报表程序
//!
//! 读取数据快照，按科室/年份/季度聚合，附加稳定配色后输出 JSON 报表。

mod report;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use kpi_admin::{init_logging, ConfigManager};
use kpi_aggregation::{aggregate, aggregate_year};
use kpi_color::{ColorMapper, Palette, PaletteCategory, PaletteRegistry};
use kpi_storage::{FileColorStore, KpiDataset};
use report::{build_report, build_year_report, ReportColors};
use tracing::{info, warn};
use uuid::Uuid;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "kpi-report")]
#[command(about = "医疗质量指标看板报表")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "kpi.toml")]
    config: String,

    /// 数据快照（JSON）
    #[arg(short, long, required_unless_present = "list_palettes")]
    dataset: Option<String>,

    /// 科室ID
    #[arg(long, required_unless_present = "list_palettes")]
    department: Option<Uuid>,

    /// 统计年份，默认取配置或当前年份
    #[arg(short, long)]
    year: Option<i32>,

    /// 季度 (1-4)，不指定时输出全年
    #[arg(short, long)]
    quarter: Option<u32>,

    /// 调色板ID，覆盖配置
    #[arg(short, long)]
    palette: Option<String>,

    /// 按调色板重新分配全部颜色
    #[arg(long)]
    reset_colors: bool,

    /// 列出调色板
    #[arg(long)]
    list_palettes: bool,

    /// 仅列出无障碍调色板
    #[arg(long)]
    accessible_only: bool,

    /// 按分类列出调色板 (professional/vibrant/pastel/accessible)
    #[arg(long)]
    palette_category: Option<PaletteCategory>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = ConfigManager::new(&args.config)?;
    let config = config_manager.get_config().await;
    init_logging(&config.logging, args.log_level.as_deref())?;

    let registry = PaletteRegistry::global();

    if args.list_palettes {
        let palettes: Vec<&Palette> = match args.palette_category {
            Some(category) => registry.by_category(category),
            None if args.accessible_only => registry.accessible(),
            None => registry.all().iter().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&palettes)?);
        return Ok(());
    }

    let dataset_path = args.dataset.context("--dataset is required")?;
    let department_id = args.department.context("--department is required")?;
    let dataset = KpiDataset::load(&dataset_path)
        .await
        .with_context(|| format!("Failed to load dataset {}", dataset_path))?;
    let department = dataset.department(department_id)?;

    let year = args
        .year
        .or(config.dashboard.fiscal_year)
        .unwrap_or_else(|| chrono::Local::now().year());
    let palette = registry
        .get_or_default(args.palette.as_deref().unwrap_or(&config.dashboard.default_palette))
        .id;

    info!("生成报表: 科室 {} ({}), {}年, 调色板 {}", department.name, department.id, year, palette);
    if department.is_read_only() {
        info!("科室 {} 已冻结，报表只读", department.name);
    }

    let mut store = FileColorStore::open(&config.colors.store_path).await?;
    let mapper = ColorMapper::new(registry);
    let colors = ReportColors::assign(&mapper, &dataset, palette, args.reset_colors, &mut store);

    // 配色先落盘，再切换配置中的调色板
    store.flush().await?;
    if args.reset_colors && palette != config.dashboard.default_palette {
        config_manager.set_default_palette(palette).await?;
    }

    let report = match args.quarter {
        Some(quarter) => {
            let result = aggregate(department_id, year, quarter, &dataset.as_input())?;
            build_report(department, &dataset, palette, &result, &colors)
        }
        None => {
            let overview = aggregate_year(department_id, year, &dataset.as_input())?;
            build_year_report(department, &dataset, palette, &overview, &colors)
        }
    };

    for quarter in &report.quarters {
        for warning in &quarter.integrity_warnings {
            warn!("数据完整性问题 {}: {:?}", quarter.quarter, warning);
        }
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
