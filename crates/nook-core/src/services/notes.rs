//! Note service: note CRUD and favourites over the remote store.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{CategoryId, Note, NoteId};
use crate::remote::{JsonMap, RecordKind, RemoteStore};
use crate::router::{WriteOutcome, WriteRouter};
use crate::util::normalize_text_option;

use super::{parse_records, record_payload};

/// Input for creating a note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub category_id: CategoryId,
    pub content: String,
    pub owner: String,
}

/// Edited fields of an existing note; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<CategoryId>,
}

impl NoteUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category_id.is_none()
    }
}

/// Note operations used by the note screens.
#[derive(Clone)]
pub struct NoteService {
    router: WriteRouter,
    remote: Arc<dyn RemoteStore>,
}

impl NoteService {
    #[must_use]
    pub fn new(router: WriteRouter, remote: Arc<dyn RemoteStore>) -> Self {
        Self { router, remote }
    }

    /// Create a note, routed through the offline-aware writer.
    pub async fn create(&self, new: NewNote) -> Result<(Note, WriteOutcome)> {
        let title = normalize_text_option(Some(new.title))
            .ok_or_else(|| Error::InvalidInput("Note title must not be empty".to_string()))?;

        let note = Note::new(title, new.category_id, new.content, new.owner);
        let outcome = self
            .router
            .save(RecordKind::Note, record_payload(&note)?)
            .await?;
        Ok((note, outcome))
    }

    /// All notes belonging to `owner`
    pub async fn list(&self, owner: &str) -> Result<Vec<Note>> {
        let rows = self
            .remote
            .query(RecordKind::Note, "owner", &serde_json::json!(owner))
            .await?;
        Ok(parse_records(RecordKind::Note, rows))
    }

    /// Notes of `owner` in the given category
    pub async fn by_category(&self, owner: &str, category_id: CategoryId) -> Result<Vec<Note>> {
        let mut notes = self.list(owner).await?;
        notes.retain(|note| note.category_id == category_id);
        Ok(notes)
    }

    /// Favourite notes of `owner`
    pub async fn favourites(&self, owner: &str) -> Result<Vec<Note>> {
        let mut notes = self.list(owner).await?;
        notes.retain(|note| note.is_favourite);
        Ok(notes)
    }

    /// Edit title, content, or category of an existing note.
    ///
    /// Edits patch the remote record directly, like the favourite toggle;
    /// only record creation is buffered offline. The update timestamp is
    /// bumped alongside the edited fields.
    pub async fn update(&self, id: &NoteId, update: NoteUpdate) -> Result<()> {
        if update.is_empty() {
            return Err(Error::InvalidInput("Nothing to update".to_string()));
        }

        let mut payload = JsonMap::new();
        if let Some(title) = update.title {
            let title = normalize_text_option(Some(title))
                .ok_or_else(|| Error::InvalidInput("Note title must not be empty".to_string()))?;
            payload.insert("title".to_string(), serde_json::json!(title));
        }
        if let Some(content) = update.content {
            payload.insert("content".to_string(), serde_json::json!(content));
        }
        if let Some(category_id) = update.category_id {
            payload.insert("category_id".to_string(), serde_json::to_value(category_id)?);
        }
        payload.insert(
            "updated_at".to_string(),
            serde_json::json!(crate::util::unix_timestamp_millis()),
        );
        self.remote
            .update(RecordKind::Note, &id.as_str(), &payload)
            .await
    }

    /// Delete a note from the remote store.
    pub async fn delete(&self, id: &NoteId) -> Result<()> {
        self.remote.delete(RecordKind::Note, &id.as_str()).await
    }

    /// Flip the favourite flag on the remote record.
    ///
    /// Favourite toggles go straight to the remote store like the other
    /// field updates; only record creation is buffered offline.
    pub async fn set_favourite(&self, id: &NoteId, favourite: bool) -> Result<()> {
        let mut payload = JsonMap::new();
        payload.insert("is_favourite".to_string(), serde_json::json!(favourite));
        payload.insert(
            "updated_at".to_string(),
            serde_json::json!(crate::util::unix_timestamp_millis()),
        );
        self.remote
            .update(RecordKind::Note, &id.as_str(), &payload)
            .await
    }
}
