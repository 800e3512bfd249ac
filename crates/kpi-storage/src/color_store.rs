//! 配色映射文件存储
//!
//! 启动时读取一次，运行中在内存里修改，有变更时整体写回。

use kpi_color::{ColorMapping, ColorStore};
use kpi_core::{EntityType, KpiError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 以单个 JSON 文件保存的配色映射
#[derive(Debug)]
pub struct FileColorStore {
    path: PathBuf,
    mapping: ColorMapping,
    dirty: bool,
}

impl FileColorStore {
    /// 打开映射文件，文件不存在时视为空映射
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mapping = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => ColorMapping::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                KpiError::Storage(format!("配色映射文件损坏 {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Color mapping file {} not found, starting empty", path.display());
                ColorMapping::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "Loaded {} color assignments from {}",
            mapping.len(),
            path.display()
        );

        Ok(Self {
            path,
            mapping,
            dirty: false,
        })
    }

    pub fn mapping(&self) -> &ColorMapping {
        &self.mapping
    }

    /// 是否有尚未写回的变更
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 将变更写回文件，无变更时不做任何IO
    ///
    /// 先写临时文件再重命名，避免写到一半留下损坏的映射。
    pub async fn flush(&mut self) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(&self.mapping)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, data).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        self.dirty = false;
        info!(
            "Saved {} color assignments to {}",
            self.mapping.len(),
            self.path.display()
        );
        Ok(true)
    }
}

impl ColorStore for FileColorStore {
    fn get(&self, key: &str) -> Option<String> {
        self.mapping.get(key)
    }

    fn set(&mut self, key: &str, color: &str) {
        if self.mapping.get(key).as_deref() != Some(color) {
            self.mapping.set(key, color);
            self.dirty = true;
        }
    }

    fn assigned_count(&self, entity_type: EntityType) -> usize {
        self.mapping.assigned_count(entity_type)
    }

    fn clear_entity_type(&mut self, entity_type: EntityType) {
        if self.mapping.assigned_count(entity_type) > 0 {
            self.mapping.clear_entity_type(entity_type);
            self.dirty = true;
        }
    }
}
