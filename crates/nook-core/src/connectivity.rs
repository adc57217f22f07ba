//! Connectivity monitor with explicit subscription lifecycle.
//!
//! Platform glue (NetInfo-style reachability callbacks, a CLI flag, a test)
//! drives [`ConnectivityMonitor::set_status`]; the sync engine holds a
//! [`ConnectivityWatcher`] and reacts to transitions. Duplicate status
//! reports are deduplicated so watchers only wake on real transitions.

use std::sync::Arc;
use tokio::sync::watch;

/// Online/offline state as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectivityStatus {
    Online,
    Offline,
}

impl ConnectivityStatus {
    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Handle owned by the root controller; cheap to clone.
#[derive(Clone, Debug)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<ConnectivityStatus>>,
}

impl ConnectivityMonitor {
    #[must_use]
    pub fn new(initial: ConnectivityStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current status snapshot
    #[must_use]
    pub fn current(&self) -> ConnectivityStatus {
        *self.tx.borrow()
    }

    /// Report a status change; no-op when the status is unchanged
    pub fn set_status(&self, status: ConnectivityStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                tracing::debug!(?status, "connectivity changed");
                *current = status;
                true
            }
        });
    }

    /// Subscribe to status transitions
    #[must_use]
    pub fn subscribe(&self) -> ConnectivityWatcher {
        ConnectivityWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(ConnectivityStatus::Offline)
    }
}

/// Receiving end of a connectivity subscription.
#[derive(Debug)]
pub struct ConnectivityWatcher {
    rx: watch::Receiver<ConnectivityStatus>,
}

impl ConnectivityWatcher {
    /// Current status snapshot
    #[must_use]
    pub fn current(&self) -> ConnectivityStatus {
        *self.rx.borrow()
    }

    /// Wait for the next status transition.
    ///
    /// Returns `None` once the monitor has been dropped.
    pub async fn next_transition(&mut self) -> Option<ConnectivityStatus> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
