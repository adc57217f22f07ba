//! Durable FIFO queue of writes made while the remote store was unreachable.
//!
//! The whole queue is serialized as one JSON list under a single persistence
//! key. Operations are appended at the tail and acknowledged from the head
//! one at a time, so a failed drain never discards unsent entries.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::persistence::LocalPersistence;
use crate::remote::{JsonMap, RecordKind};

/// Default persistence key for the pending-operation list.
pub const PENDING_OPERATIONS_KEY: &str = "pending_operations";

/// A buffered write awaiting remote persistence.
///
/// The payload is opaque to the queue and the sync engine; it is forwarded
/// to the remote store verbatim. Operations are never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Target record collection
    pub kind: RecordKind,
    /// Full record to be created
    pub payload: JsonMap,
    /// When the write was buffered (Unix ms)
    pub queued_at: i64,
}

impl PendingOperation {
    #[must_use]
    pub fn new(kind: RecordKind, payload: JsonMap) -> Self {
        Self {
            kind,
            payload,
            queued_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Persisted FIFO queue over a [`LocalPersistence`] backend.
///
/// Every mutation is a read-modify-write of the stored list, guarded by an
/// async lock so router appends and sync-engine removals never interleave.
#[derive(Clone)]
pub struct PendingQueue {
    store: Arc<dyn LocalPersistence>,
    key: String,
    guard: Arc<Mutex<()>>,
}

impl PendingQueue {
    #[must_use]
    pub fn new(store: Arc<dyn LocalPersistence>) -> Self {
        Self::with_key(store, PENDING_OPERATIONS_KEY)
    }

    #[must_use]
    pub fn with_key(store: Arc<dyn LocalPersistence>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Append an operation at the tail, durably before returning.
    ///
    /// When the backing store is unavailable the error propagates and the
    /// operation is lost; there is no in-memory fallback.
    pub async fn append(&self, operation: PendingOperation) -> Result<()> {
        let _guard = self.guard.lock().await;
        let mut operations = self.load().await?;
        operations.push(operation);
        self.save(&operations).await
    }

    /// Full ordered list of pending operations (empty when none)
    pub async fn read_all(&self) -> Result<Vec<PendingOperation>> {
        let _guard = self.guard.lock().await;
        self.load().await
    }

    /// Remove and return the head of the queue, if any.
    ///
    /// Called only after the remote store confirmed the head was persisted.
    pub async fn remove_first(&self) -> Result<Option<PendingOperation>> {
        let _guard = self.guard.lock().await;
        let mut operations = self.load().await?;
        if operations.is_empty() {
            return Ok(None);
        }
        let removed = operations.remove(0);
        self.save(&operations).await?;
        Ok(Some(removed))
    }

    /// Drop all pending operations
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        self.store.remove(&self.key).await
    }

    /// Number of pending operations
    pub async fn len(&self) -> Result<usize> {
        Ok(self.read_all().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    async fn load(&self) -> Result<Vec<PendingOperation>> {
        match self.store.get(&self.key).await? {
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(operations) => Ok(operations),
                Err(error) => {
                    self.quarantine(&bytes, &error).await?;
                    Err(Error::Persistence(format!(
                        "pending queue was undecodable and has been set aside: {error}"
                    )))
                }
            },
            None => Ok(Vec::new()),
        }
    }

    /// Move undecodable queue bytes aside so the queue recovers as empty.
    ///
    /// The raw bytes stay available for inspection under a timestamped key;
    /// the caller surfaces the condition once and every later call starts
    /// from a fresh queue.
    async fn quarantine(&self, bytes: &[u8], error: &serde_json::Error) -> Result<()> {
        let backup_key = format!(
            "{}-corrupt-{}",
            self.key,
            chrono::Utc::now().timestamp_millis()
        );
        tracing::warn!(
            key = %self.key,
            backup_key = %backup_key,
            %error,
            "quarantining undecodable pending queue"
        );
        self.store.set(&backup_key, bytes).await?;
        self.store.remove(&self.key).await
    }

    async fn save(&self, operations: &[PendingOperation]) -> Result<()> {
        let bytes = serde_json::to_vec(operations)?;
        self.store.set(&self.key, &bytes).await
    }
}
