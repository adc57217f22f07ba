//! Sync engine: replays the pending queue against the remote store.
//!
//! Runs as a background reaction to connectivity transitions. Errors are
//! logged, never propagated to a UI; the report exists for observability
//! and manual `sync` commands.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::connectivity::ConnectivityWatcher;
use crate::queue::PendingQueue;
use crate::remote::RemoteStore;

/// Outcome of one drain pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Operations confirmed by the remote store and removed from the queue
    pub synced: usize,
    /// Operations still queued (failed head plus everything behind it)
    pub remaining: usize,
}

/// Drains the pending queue, one confirmed operation at a time.
pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    queue: PendingQueue,
    // Serializes drains: connectivity flapping must not interleave two
    // passes over the queue.
    drain_guard: Mutex<()>,
}

impl SyncEngine {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteStore>, queue: PendingQueue) -> Self {
        Self {
            remote,
            queue,
            drain_guard: Mutex::new(()),
        }
    }

    /// Replay all pending operations in insertion order.
    ///
    /// Each operation is removed from the queue only after the remote store
    /// confirms it (at-least-once delivery). On the first remote failure the
    /// pass stops and the failed operation plus the remainder stay queued
    /// for the next online transition.
    pub async fn drain(&self) -> DrainReport {
        let _guard = self.drain_guard.lock().await;

        let pending = match self.queue.read_all().await {
            Ok(pending) => pending,
            Err(error) => {
                tracing::error!(%error, "cannot read pending queue, skipping drain");
                return DrainReport::default();
            }
        };
        if pending.is_empty() {
            return DrainReport::default();
        }

        let total = pending.len();
        tracing::info!(total, "draining pending operations");

        let mut synced = 0;
        for operation in pending {
            match self.remote.create(operation.kind, &operation.payload).await {
                Ok(id) => {
                    tracing::debug!(kind = %operation.kind, id, "pending operation synced");
                    if let Err(error) = self.queue.remove_first().await {
                        tracing::error!(%error, "failed to acknowledge synced operation");
                        break;
                    }
                    synced += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        kind = %operation.kind,
                        %error,
                        "remote rejected pending operation, keeping remainder queued"
                    );
                    break;
                }
            }
        }

        DrainReport {
            synced,
            remaining: total - synced,
        }
    }

    /// Background loop: drain on every offline-to-online transition.
    ///
    /// Ends when the connectivity monitor is dropped. Also drains once at
    /// startup if the device is already online, mirroring reachability APIs
    /// that deliver the current state to a fresh listener.
    pub async fn run(self: Arc<Self>, mut watcher: ConnectivityWatcher) {
        if watcher.current().is_online() {
            self.drain().await;
        }
        while let Some(status) = watcher.next_transition().await {
            if status.is_online() {
                self.drain().await;
            }
        }
        tracing::debug!("connectivity monitor closed, sync loop ending");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{ConnectivityMonitor, ConnectivityStatus};
    use crate::persistence::MemoryPersistence;
    use crate::queue::PendingOperation;
    use crate::remote::RecordKind;
    use crate::router::WriteRouter;
    use crate::testutil::{named_payload, MockRemote};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn memory_queue() -> PendingQueue {
        PendingQueue::new(Arc::new(MemoryPersistence::new()))
    }

    async fn enqueue(queue: &PendingQueue, kind: RecordKind, name: &str) {
        queue
            .append(PendingOperation::new(kind, named_payload(name)))
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_of_empty_queue_makes_no_remote_calls() {
        let remote = MockRemote::new();
        let engine = SyncEngine::new(Arc::clone(&remote) as _, memory_queue());

        assert_eq!(engine.drain().await, DrainReport::default());
        assert_eq!(engine.drain().await, DrainReport::default());
        assert!(remote.create_attempts().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_replays_in_insertion_order() {
        let remote = MockRemote::new();
        let queue = memory_queue();
        enqueue(&queue, RecordKind::Category, "a").await;
        enqueue(&queue, RecordKind::Note, "b").await;
        enqueue(&queue, RecordKind::Category, "c").await;

        let engine = SyncEngine::new(Arc::clone(&remote) as _, queue.clone());
        let report = engine.drain().await;

        assert_eq!(report, DrainReport { synced: 3, remaining: 0 });
        assert_eq!(remote.attempted_names(), vec!["a", "b", "c"]);
        assert!(queue.is_empty().await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn partial_failure_keeps_failed_item_and_remainder() {
        let remote = MockRemote::new();
        remote.fail_name("b");
        let queue = memory_queue();
        for name in ["a", "b", "c"] {
            enqueue(&queue, RecordKind::Category, name).await;
        }

        let engine = SyncEngine::new(Arc::clone(&remote) as _, queue.clone());
        let report = engine.drain().await;
        assert_eq!(report, DrainReport { synced: 1, remaining: 2 });

        // a is confirmed and gone; b (failed) and c stay queued
        let pending = queue.read_all().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].payload["name"], "b");
        assert_eq!(pending[1].payload["name"], "c");

        // next drain after the outage clears the rest; a is never re-sent
        remote.clear_failures();
        let report = engine.drain().await;
        assert_eq!(report, DrainReport { synced: 2, remaining: 0 });
        assert_eq!(remote.attempted_names(), vec!["a", "b", "b", "c"]);
        assert_eq!(
            remote
                .attempted_names()
                .iter()
                .filter(|name| *name == "a")
                .count(),
            1
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_drains_do_not_double_send() {
        let remote = MockRemote::new();
        let queue = memory_queue();
        enqueue(&queue, RecordKind::Category, "a").await;
        enqueue(&queue, RecordKind::Category, "b").await;

        let engine = Arc::new(SyncEngine::new(Arc::clone(&remote) as _, queue.clone()));
        let (left, right) = tokio::join!(engine.drain(), engine.drain());

        assert_eq!(left.synced + right.synced, 2);
        assert_eq!(remote.attempted_names(), vec!["a", "b"]);
        assert!(queue.is_empty().await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn online_transition_drains_offline_writes_in_order() {
        // Full scenario: two category writes while offline, then the device
        // comes back online and both reach the remote store in order.
        let remote = MockRemote::new();
        let queue = memory_queue();
        let monitor = ConnectivityMonitor::new(ConnectivityStatus::Offline);
        let router = WriteRouter::new(
            Arc::clone(&remote) as _,
            queue.clone(),
            monitor.clone(),
        );

        router
            .save(RecordKind::Category, named_payload("Health"))
            .await
            .unwrap();
        router
            .save(RecordKind::Category, named_payload("Work"))
            .await
            .unwrap();
        assert_eq!(queue.len().await.unwrap(), 2);

        let engine = Arc::new(SyncEngine::new(Arc::clone(&remote) as _, queue.clone()));
        let task = tokio::spawn(Arc::clone(&engine).run(monitor.subscribe()));

        monitor.set_status(ConnectivityStatus::Online);

        // Wait for the background drain to settle
        for _ in 0..100 {
            if queue.is_empty().await.unwrap() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(remote.attempted_names(), vec!["Health", "Work"]);
        assert!(queue.is_empty().await.unwrap());

        // Both sender handles must go away for the run loop to end
        drop(router);
        drop(monitor);
        task.await.unwrap();
    }
}
