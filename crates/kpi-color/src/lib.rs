//! # KPI配色模块
//!
//! 提供调色板目录与稳定配色分配：
//! - 调色板注册表：只读的命名调色板目录
//! - 配色映射存储：以实体标识为键持久化颜色
//! - 配色分配：保证新增、删除、切换调色板时已有实体颜色不变

pub mod mapping;
pub mod palette;
pub mod store;

// 重新导出主要类型
pub use mapping::{BatchAssignment, ColorMapper};
pub use palette::{Palette, PaletteCategory, PaletteRegistry, DEFAULT_PALETTE_ID};
pub use store::{ColorMapping, ColorStore};
