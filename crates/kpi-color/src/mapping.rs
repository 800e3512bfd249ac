//! 稳定配色分配
//!
//! 已分配的颜色永远原样返回；新实体按调色板顺序循环取色并立即写入存储。
//! 仅在显式重置时按列表位置重新分配。

use crate::palette::{Palette, PaletteRegistry};
use crate::store::{ColorMapping, ColorStore};
use kpi_core::EntityType;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// 批量分配结果
#[derive(Debug, Clone, Default)]
pub struct BatchAssignment {
    /// 实体ID -> 颜色，覆盖输入列表中的每一项
    pub color_map: HashMap<Uuid, String>,
    /// 本次新分配颜色的实体，保持输入顺序
    pub newly_assigned: Vec<Uuid>,
}

impl BatchAssignment {
    pub fn color_of(&self, entity_id: Uuid) -> Option<&str> {
        self.color_map.get(&entity_id).map(String::as_str)
    }
}

/// 配色分配服务
#[derive(Debug, Clone, Copy)]
pub struct ColorMapper<'r> {
    registry: &'r PaletteRegistry,
}

impl ColorMapper<'static> {
    /// 使用内置调色板目录
    pub fn with_builtin_palettes() -> Self {
        Self::new(PaletteRegistry::global())
    }
}

impl<'r> ColorMapper<'r> {
    pub fn new(registry: &'r PaletteRegistry) -> Self {
        Self { registry }
    }

    fn palette(&self, palette_id: &str) -> &'r Palette {
        self.registry.get_or_default(palette_id)
    }

    /// 获取单个实体的颜色
    ///
    /// 已有分配时忽略 `palette_id` 直接返回；否则以该类实体已分配数量为
    /// 序号在调色板中循环取色，写入存储后返回。
    pub fn color_for<S>(
        &self,
        entity_type: EntityType,
        entity_id: Uuid,
        palette_id: &str,
        store: &mut S,
    ) -> String
    where
        S: ColorStore + ?Sized,
    {
        let key = entity_type.mapping_key(entity_id);
        if let Some(color) = store.get(&key) {
            return color;
        }

        let palette = self.palette(palette_id);
        let color = palette.color_at(store.assigned_count(entity_type));
        store.set(&key, color);
        debug!("Assigned {} to {} from palette '{}'", color, key, palette.id);
        color.to_string()
    }

    /// 为整个列表分配颜色
    ///
    /// 第一遍统计列表中已有颜色的实体数作为起始偏移；第二遍按列表顺序
    /// 为未分配的实体依次取色。
    pub fn build_mapping<S>(
        &self,
        items: &[Uuid],
        entity_type: EntityType,
        palette_id: &str,
        store: &mut S,
    ) -> BatchAssignment
    where
        S: ColorStore + ?Sized,
    {
        let palette = self.palette(palette_id);
        let mut assignment = BatchAssignment::default();

        let mut assigned_count = items
            .iter()
            .filter(|id| store.get(&entity_type.mapping_key(**id)).is_some())
            .count();

        for &entity_id in items {
            let key = entity_type.mapping_key(entity_id);
            let color = match store.get(&key) {
                Some(color) => color,
                None => {
                    let color = palette.color_at(assigned_count);
                    assigned_count += 1;
                    store.set(&key, color);
                    assignment.newly_assigned.push(entity_id);
                    color.to_string()
                }
            };
            assignment.color_map.insert(entity_id, color);
        }

        if !assignment.newly_assigned.is_empty() {
            info!(
                "Assigned {} new {} colors from palette '{}'",
                assignment.newly_assigned.len(),
                entity_type,
                palette.id
            );
        }
        assignment
    }

    /// 按新调色板重建映射，第 i 项取 `colors[i % len]`
    pub fn reset_for_palette(
        &self,
        items: &[Uuid],
        entity_type: EntityType,
        new_palette_id: &str,
    ) -> ColorMapping {
        let palette = self.palette(new_palette_id);
        items
            .iter()
            .enumerate()
            .map(|(i, id)| (entity_type.mapping_key(*id), palette.color_at(i).to_string()))
            .collect()
    }

    /// 重建映射并替换存储中该类实体的全部分配
    pub fn apply_reset<S>(
        &self,
        items: &[Uuid],
        entity_type: EntityType,
        new_palette_id: &str,
        store: &mut S,
    ) -> ColorMapping
    where
        S: ColorStore + ?Sized,
    {
        let fresh = self.reset_for_palette(items, entity_type, new_palette_id);
        store.replace_entity_type(entity_type, &fresh);
        info!(
            "Reset {} {} colors to palette '{}'",
            fresh.len(),
            entity_type,
            self.palette(new_palette_id).id
        );
        fresh
    }
}
