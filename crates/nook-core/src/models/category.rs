//! Category model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for a category, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Create a new unique category ID using UUID v7
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

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A category in the user's hierarchy.
///
/// Categories form a forest per owner: `parent` is `None` for top-level
/// categories and otherwise references another category by stable ID. Notes
/// link to categories by that same stable ID, so renaming a category never
/// orphans its notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// Parent category, `None` for a top-level category
    #[serde(default)]
    pub parent: Option<CategoryId>,
    /// URI of the category's cover image in object storage
    #[serde(default)]
    pub image_url: Option<String>,
    /// Owning user identity
    pub owner: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl Category {
    /// Create a new top-level category for the given owner
    #[must_use]
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            parent: None,
            image_url: None,
            owner: owner.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Attach this category under a parent
    #[must_use]
    pub const fn with_parent(mut self, parent: CategoryId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the cover image URI
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Check whether this is a top-level category
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
