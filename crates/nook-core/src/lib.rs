//! nook-core - Core library for Nook
//!
//! This crate contains the shared models, the offline write queue, and the
//! sync engine used by all Nook clients (mobile, CLI). Screens talk to the
//! services; the services route writes through the offline-aware
//! [`router::WriteRouter`], and [`sync::SyncEngine`] replays buffered writes
//! once connectivity returns.

pub mod connectivity;
pub mod error;
pub mod models;
pub mod persistence;
pub mod queue;
pub mod remote;
pub mod router;
pub mod services;
pub mod sync;
pub mod util;

#[cfg(test)]
pub(crate) mod testutil;

pub use connectivity::{ConnectivityMonitor, ConnectivityStatus, ConnectivityWatcher};
pub use error::{Error, Result};
pub use models::{Category, CategoryId, Note, NoteId};
pub use queue::{PendingOperation, PendingQueue};
pub use remote::{HttpRemoteStore, JsonMap, RecordKind, RemoteStore};
pub use router::{WriteOutcome, WriteRouter};
pub use sync::{DrainReport, SyncEngine};
