//! Local fallback persistence

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use super::{LocalSlot, StoreResult};
use crate::types::NewsItem;

/// Slot stored as a JSON array in `<dir>/<key>.json`
///
/// Writes go to a sibling temp file that is renamed into place, so a reader
/// sees either the old or the new sequence.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(dir: &Path, key: &str) -> Self {
        Self {
            path: dir.join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LocalSlot for FileSlot {
    async fn load(&self) -> Vec<NewsItem> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to read local slot {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&text) {
            Ok(items) => items,
            Err(e) => {
                warn!("Ignoring malformed local slot {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    async fn store(&self, items: &[NewsItem]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string(items)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// In-memory slot, scoped to the process
#[derive(Debug, Default)]
pub struct MemorySlot {
    items: Mutex<Vec<NewsItem>>,
}

impl MemorySlot {
    pub fn with_items(items: Vec<NewsItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    pub fn snapshot(&self) -> Vec<NewsItem> {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl LocalSlot for MemorySlot {
    async fn load(&self) -> Vec<NewsItem> {
        self.snapshot()
    }

    async fn store(&self, items: &[NewsItem]) -> StoreResult<()> {
        *self.items.lock().unwrap_or_else(|e| e.into_inner()) = items.to_vec();
        Ok(())
    }
}
