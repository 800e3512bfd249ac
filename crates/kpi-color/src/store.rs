//! 配色映射存储
//!
//! 映射表以 `{实体类型}-{实体ID}` 为键保存十六进制颜色。

use kpi_core::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 配色映射的读写接口
///
/// 每次分配是一次“读取-判断-写入”，调用方以 `&mut` 独占存储。
pub trait ColorStore {
    /// 读取已分配的颜色
    fn get(&self, key: &str) -> Option<String>;

    /// 写入颜色
    fn set(&mut self, key: &str, color: &str);

    /// 某类实体已分配颜色的数量
    fn assigned_count(&self, entity_type: EntityType) -> usize;

    /// 清除某类实体的全部分配
    fn clear_entity_type(&mut self, entity_type: EntityType);

    /// 用新的映射替换某类实体的全部分配，其他类型保持不变
    fn replace_entity_type(&mut self, entity_type: EntityType, fresh: &ColorMapping) {
        self.clear_entity_type(entity_type);
        for (key, color) in fresh.iter() {
            self.set(key, color);
        }
    }
}

/// 内存中的配色映射表，序列化为一个扁平 JSON 对象
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorMapping {
    entries: BTreeMap<String, String>,
}

impl ColorMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    fn prefix(entity_type: EntityType) -> String {
        format!("{}-", entity_type.as_str())
    }
}

impl ColorStore for ColorMapping {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, color: &str) {
        self.entries.insert(key.to_string(), color.to_string());
    }

    fn assigned_count(&self, entity_type: EntityType) -> usize {
        let prefix = Self::prefix(entity_type);
        self.entries.keys().filter(|k| k.starts_with(&prefix)).count()
    }

    fn clear_entity_type(&mut self, entity_type: EntityType) {
        let prefix = Self::prefix(entity_type);
        self.entries.retain(|k, _| !k.starts_with(&prefix));
    }
}

impl FromIterator<(String, String)> for ColorMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_counts_by_entity_type() {
        let mut mapping = ColorMapping::new();
        mapping.set(&EntityType::Indicator.mapping_key(Uuid::new_v4()), "#4e79a7");
        mapping.set(&EntityType::Indicator.mapping_key(Uuid::new_v4()), "#f28e2b");
        mapping.set(&EntityType::Category.mapping_key(Uuid::new_v4()), "#e15759");

        assert_eq!(mapping.assigned_count(EntityType::Indicator), 2);
        assert_eq!(mapping.assigned_count(EntityType::Category), 1);
        assert_eq!(mapping.len(), 3);
    }

    #[test]
    fn test_replace_entity_type_keeps_other_types() {
        let category_key = EntityType::Category.mapping_key(Uuid::new_v4());
        let old_key = EntityType::Indicator.mapping_key(Uuid::new_v4());
        let new_key = EntityType::Indicator.mapping_key(Uuid::new_v4());

        let mut mapping = ColorMapping::new();
        mapping.set(&category_key, "#e15759");
        mapping.set(&old_key, "#4e79a7");

        let fresh: ColorMapping = [(new_key.clone(), "#1f77b4".to_string())]
            .into_iter()
            .collect();
        mapping.replace_entity_type(EntityType::Indicator, &fresh);

        assert_eq!(mapping.get(&category_key).as_deref(), Some("#e15759"));
        assert_eq!(mapping.get(&old_key), None);
        assert_eq!(mapping.get(&new_key).as_deref(), Some("#1f77b4"));
    }

    #[test]
    fn test_json_shape() {
        let mut mapping = ColorMapping::new();
        mapping.set("category-1", "#000000");
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r##"{"category-1":"#000000"}"##);

        let parsed: ColorMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, mapping);
    }
}
