//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::CategoryId;

/// A unique identifier for a note, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A note attached to a category.
///
/// `content` is rich text in the editor's serialized form; the core treats it
/// as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Title shown in lists
    pub title: String,
    /// Stable reference to the owning category
    pub category_id: CategoryId,
    /// Serialized rich-text content
    pub content: String,
    /// Favourite flag
    #[serde(default)]
    pub is_favourite: bool,
    /// Owning user identity
    pub owner: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Note {
    /// Create a new note in the given category
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        category_id: CategoryId,
        content: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: NoteId::new(),
            title: title.into(),
            category_id,
            content: content.into(),
            is_favourite: false,
            owner: owner.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the favourite flag, bumping the update timestamp
    pub fn set_favourite(&mut self, favourite: bool) {
        self.is_favourite = favourite;
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }

    /// Check if the note has no usable content (whitespace-only counts as empty)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_id_unique() {
        let id1 = NoteId::new();
        let id2 = NoteId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_note_id_parse() {
        let id = NoteId::new();
        let parsed: NoteId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_note_new() {
        let category = CategoryId::new();
        let note = Note::new("Groceries", category, "milk, eggs", "user-1");
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.category_id, category);
        assert!(!note.is_favourite);
        assert!(note.created_at > 0);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_set_favourite() {
        let mut note = Note::new("Groceries", CategoryId::new(), "", "user-1");
        note.set_favourite(true);
        assert!(note.is_favourite);
        assert!(note.updated_at >= note.created_at);
    }

    #[test]
    fn test_is_empty() {
        let empty = Note::new("  ", CategoryId::new(), "   ", "user-1");
        assert!(empty.is_empty());

        let titled = Note::new("Title", CategoryId::new(), "", "user-1");
        assert!(!titled.is_empty());
    }
}
