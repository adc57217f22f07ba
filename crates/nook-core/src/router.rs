//! Write router: direct remote write when possible, local queue otherwise.

use std::sync::Arc;

use crate::connectivity::ConnectivityMonitor;
use crate::error::Result;
use crate::queue::{PendingOperation, PendingQueue};
use crate::remote::{JsonMap, RecordKind, RemoteStore};

/// Where a write request ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Persisted by the remote store, with the assigned remote ID
    SavedRemotely(String),
    /// Buffered in the local queue, will sync on the next online transition
    SavedLocally,
}

impl WriteOutcome {
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::SavedRemotely(_))
    }
}

/// Routes each write request to the remote store or the pending queue.
///
/// Per request there is exactly one remote attempt; retry happens only via
/// the sync engine on a later connectivity transition.
#[derive(Clone)]
pub struct WriteRouter {
    remote: Arc<dyn RemoteStore>,
    queue: PendingQueue,
    connectivity: ConnectivityMonitor,
}

impl WriteRouter {
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        queue: PendingQueue,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        Self {
            remote,
            queue,
            connectivity,
        }
    }

    /// Persist a record remotely, falling back to the local queue.
    ///
    /// Remote errors are demoted to a `SavedLocally` outcome; only a failure
    /// of the local queue itself propagates, because at that point the write
    /// is lost and the caller must tell the user.
    pub async fn save(&self, kind: RecordKind, payload: JsonMap) -> Result<WriteOutcome> {
        if !self.connectivity.current().is_online() {
            tracing::debug!(%kind, "offline, buffering write locally");
            self.enqueue(kind, payload).await?;
            return Ok(WriteOutcome::SavedLocally);
        }

        match self.remote.create(kind, &payload).await {
            Ok(id) => {
                tracing::debug!(%kind, id, "record saved remotely");
                Ok(WriteOutcome::SavedRemotely(id))
            }
            Err(error) => {
                tracing::warn!(%kind, %error, "remote write failed, buffering locally");
                self.enqueue(kind, payload).await?;
                Ok(WriteOutcome::SavedLocally)
            }
        }
    }

    async fn enqueue(&self, kind: RecordKind, payload: JsonMap) -> Result<()> {
        self.queue.append(PendingOperation::new(kind, payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::ConnectivityStatus;
    use crate::persistence::MemoryPersistence;
    use crate::testutil::{named_payload, FailingPersistence, MockRemote};

    fn memory_queue() -> PendingQueue {
        PendingQueue::new(Arc::new(MemoryPersistence::new()))
    }

    fn router(
        remote: Arc<MockRemote>,
        queue: PendingQueue,
        status: ConnectivityStatus,
    ) -> WriteRouter {
        WriteRouter::new(remote, queue, ConnectivityMonitor::new(status))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn online_write_goes_remote() {
        let remote = MockRemote::new();
        let queue = memory_queue();
        let router = router(Arc::clone(&remote), queue.clone(), ConnectivityStatus::Online);

        let outcome = router
            .save(RecordKind::Category, named_payload("Health"))
            .await
            .unwrap();
        assert!(outcome.is_remote());
        assert_eq!(remote.create_attempts().len(), 1);
        assert!(queue.is_empty().await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_write_is_queued_without_remote_attempt() {
        let remote = MockRemote::new();
        let queue = memory_queue();
        let router = router(
            Arc::clone(&remote),
            queue.clone(),
            ConnectivityStatus::Offline,
        );

        let outcome = router
            .save(RecordKind::Note, named_payload("Groceries"))
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::SavedLocally);
        assert!(remote.create_attempts().is_empty());
        assert_eq!(queue.len().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failing_remote_queues_exactly_one_operation_per_write() {
        let remote = MockRemote::failing();
        let queue = memory_queue();
        let router = router(Arc::clone(&remote), queue.clone(), ConnectivityStatus::Online);

        for name in ["a", "b", "c"] {
            let outcome = router
                .save(RecordKind::Category, named_payload(name))
                .await
                .unwrap();
            assert_eq!(outcome, WriteOutcome::SavedLocally);
        }

        // One append per request, nothing silently dropped
        let pending = queue.read_all().await.unwrap();
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0].payload["name"], "a");
        assert_eq!(pending[2].payload["name"], "c");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn queue_failure_surfaces_to_caller() {
        let remote = MockRemote::failing();
        let queue = PendingQueue::new(Arc::new(FailingPersistence));
        let router = router(remote, queue, ConnectivityStatus::Online);

        let error = router
            .save(RecordKind::Category, named_payload("lost"))
            .await
            .unwrap_err();
        assert!(matches!(error, crate::Error::Persistence(_)));
    }
}
