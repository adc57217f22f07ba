//! Domain services the screens talk to.
//!
//! Services validate input, convert typed records to the opaque payloads the
//! write router forwards, and parse query results coming back from the
//! remote store.

mod categories;
mod notes;

pub use categories::{ensure_acyclic, CategoryService, NewCategory};
pub use notes::{NewNote, NoteService, NoteUpdate};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::remote::{JsonMap, RecordKind};

/// Serialize a record into the payload form the remote store accepts.
pub(crate) fn record_payload<T: Serialize>(record: &T) -> Result<JsonMap> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(Error::InvalidInput(
            "Record must serialize to a JSON object".to_string(),
        )),
    }
}

/// Parse query rows into typed records, skipping malformed ones.
pub(crate) fn parse_records<T: DeserializeOwned>(kind: RecordKind, rows: Vec<JsonMap>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| {
            match serde_json::from_value::<T>(serde_json::Value::Object(row)) {
                Ok(record) => Some(record),
                Err(error) => {
                    tracing::warn!(%kind, %error, "skipping malformed remote record");
                    None
                }
            }
        })
        .collect()
}
