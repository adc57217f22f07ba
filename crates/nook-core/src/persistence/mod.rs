//! Local persistence capability (key-value bytes).
//!
//! The offline queue stores its serialized state under a single key; the
//! backing store only needs get/set/remove semantics that survive process
//! restart.

mod file;

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::error::Result;

pub use file::FilePersistence;

/// Durable key-value byte storage.
#[async_trait]
pub trait LocalPersistence: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Durably store `value` under `key`
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value stored under `key`; removing an absent key is a no-op
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory persistence (primarily for tests)
#[derive(Default)]
pub struct MemoryPersistence {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalPersistence for MemoryPersistence {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
