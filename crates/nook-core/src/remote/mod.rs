//! Remote document-store capability.
//!
//! The hosted backend is abstracted as [`RemoteStore`]; the sync core only
//! ever forwards opaque JSON payloads to it. [`HttpRemoteStore`] is the
//! concrete REST binding used by the clients.

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub use http::HttpRemoteStore;

/// A JSON object payload as stored in the remote document store.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Record collections known to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Category,
    Note,
}

impl RecordKind {
    /// Stable string tag, also used in the persisted queue
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "category" => Ok(Self::Category),
            "note" => Ok(Self::Note),
            other => Err(Error::InvalidInput(format!("Unknown record kind: {other}"))),
        }
    }
}

/// Write/query capability of the hosted document store.
///
/// Implementations own transport, auth, and timeouts; callers treat every
/// failure the same way (fall back to the local queue or surface it).
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Persist a new record, returning its remote ID
    async fn create(&self, kind: RecordKind, payload: &JsonMap) -> Result<String>;

    /// Update fields of an existing record
    async fn update(&self, kind: RecordKind, id: &str, payload: &JsonMap) -> Result<()>;

    /// Delete an existing record
    async fn delete(&self, kind: RecordKind, id: &str) -> Result<()>;

    /// Fetch records where `field == value`
    async fn query(
        &self,
        kind: RecordKind,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<JsonMap>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_kind_round_trips_through_str() {
        for kind in [RecordKind::Category, RecordKind::Note] {
            let parsed: RecordKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn record_kind_rejects_unknown_tag() {
        assert!("product".parse::<RecordKind>().is_err());
    }

    #[test]
    fn record_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RecordKind::Category).unwrap(),
            "\"category\""
        );
    }
}
