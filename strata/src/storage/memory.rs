//! In-memory storage
//!
//! Keeps saved data in process memory. Handy for tests, benches and
//! examples; nothing survives the process.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use super::ShardedStorageProvider;
use super::StorageProvider;

/// MemoryStore specific errors.
#[derive(Error, Debug)]
pub enum MemoryStoreError {
    /// Load attempted before any save
    #[error("nothing has been saved")]
    Empty,
}

/// Stores tree data in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<Vec<u8>>>,
    levels: Mutex<BTreeMap<u32, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageProvider for MemoryStore {
    async fn save(&self, data: &[u8]) -> Result<()> {
        *self.blob.lock().await = Some(data.to_vec());
        Ok(())
    }

    async fn load(&self) -> Result<Vec<u8>> {
        self.blob
            .lock()
            .await
            .clone()
            .ok_or_else(|| MemoryStoreError::Empty.into())
    }
}

#[async_trait]
impl ShardedStorageProvider for MemoryStore {
    async fn save_levels(&self, levels: &BTreeMap<u32, Vec<u8>>) -> Result<()> {
        *self.levels.lock().await = levels.clone();
        Ok(())
    }

    async fn load_levels(&self) -> Result<BTreeMap<u32, Vec<u8>>> {
        let levels = self.levels.lock().await;
        if levels.is_empty() {
            return Err(MemoryStoreError::Empty.into());
        }
        Ok(levels.clone())
    }
}
