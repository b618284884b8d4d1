//! Storage providers
//!
//! A [`crate::tree::Strata`] tree persists through anything implementing
//! [`StorageProvider`]: an opaque byte sink and source. Backends which
//! prefer many small objects over one large one (remote key-value stores
//! charging per round trip, typically) can additionally implement
//! [`ShardedStorageProvider`] and receive one blob per tree level.
//!
//! Two providers ship with the crate: [`FileStore`] for local files and
//! [`MemoryStore`] for tests and examples. Errors are the provider's own
//! and reach the caller unchanged; the tree never retries.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

pub use file::FileStore;
pub use file::FileStoreError;
pub use memory::MemoryStore;
pub use memory::MemoryStoreError;

mod file;
mod memory;

/// An asynchronous byte sink and source for whole-tree persistence.
#[async_trait]
pub trait StorageProvider {
    /// Persist an opaque buffer, replacing prior content.
    async fn save(&self, data: &[u8]) -> Result<()>;

    /// Retrieve the most recently saved buffer. Fails if none exists.
    async fn load(&self) -> Result<Vec<u8>>;
}

/// Level-indexed persistence: each tree level stored as an independently
/// addressable object.
#[async_trait]
pub trait ShardedStorageProvider: StorageProvider {
    /// Persist one buffer per level, replacing prior levels.
    async fn save_levels(&self, levels: &BTreeMap<u32, Vec<u8>>) -> Result<()>;

    /// Retrieve every saved level buffer. Fails if none exist.
    async fn load_levels(&self) -> Result<BTreeMap<u32, Vec<u8>>>;
}
