//! # KPI存储模块
//!
//! 负责配色映射的文件持久化，以及从数据层导出的指标数据快照的读取。

pub mod color_store;
pub mod dataset;

pub use color_store::FileColorStore;
pub use dataset::KpiDataset;
