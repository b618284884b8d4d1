//! File storage
//!
//! The whole-tree blob lives at the configured path. Level shards live
//! alongside it as `<path>.level<N>`, one file per level, which keeps each
//! level independently addressable the way a keyed object store would.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::try_join_all;
use thiserror::Error;
use tokio::fs;

use super::ShardedStorageProvider;
use super::StorageProvider;

/// FileStore specific errors.
#[derive(Error, Debug)]
pub enum FileStoreError {
    /// Could not find any level files next to the base path
    #[error("no level data found at: {}", .0.display())]
    NoLevelData(PathBuf),
}

/// Stores tree data in local files.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a provider rooted at the specified path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().into(),
        }
    }

    fn level_path(&self, level: u32) -> PathBuf {
        PathBuf::from(format!("{}.level{}", self.path.display(), level))
    }
}

#[async_trait]
impl StorageProvider for FileStore {
    async fn save(&self, data: &[u8]) -> Result<()> {
        tracing::debug!(path = %self.path.display(), bytes = data.len(), "writing blob");
        fs::write(&self.path, data).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path).await?)
    }
}

#[async_trait]
impl ShardedStorageProvider for FileStore {
    async fn save_levels(&self, levels: &BTreeMap<u32, Vec<u8>>) -> Result<()> {
        // All level writes in flight together
        try_join_all(levels.iter().map(|(level, blob)| {
            let path = self.level_path(*level);
            tracing::debug!(path = %path.display(), bytes = blob.len(), "writing level");
            async move { fs::write(path, blob).await }
        }))
        .await?;
        Ok(())
    }

    async fn load_levels(&self) -> Result<BTreeMap<u32, Vec<u8>>> {
        let prefix = format!(
            "{}.level",
            self.path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
        );
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut levels = BTreeMap::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(suffix) = name.strip_prefix(&prefix) else {
                continue;
            };
            let Ok(level) = suffix.parse::<u32>() else {
                continue;
            };
            levels.insert(level, fs::read(entry.path()).await?);
        }

        if levels.is_empty() {
            return Err(FileStoreError::NoLevelData(self.path.clone()).into());
        }
        Ok(levels)
    }
}
