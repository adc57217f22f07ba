//! Category service: hierarchy management over the remote store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{Category, CategoryId};
use crate::remote::{RecordKind, RemoteStore};
use crate::router::{WriteOutcome, WriteRouter};
use crate::util::normalize_text_option;

use super::{parse_records, record_payload};

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub parent: Option<CategoryId>,
    pub image_url: Option<String>,
    pub owner: String,
}

/// Category operations used by the category screens.
#[derive(Clone)]
pub struct CategoryService {
    router: WriteRouter,
    remote: Arc<dyn RemoteStore>,
}

impl CategoryService {
    #[must_use]
    pub fn new(router: WriteRouter, remote: Arc<dyn RemoteStore>) -> Self {
        Self { router, remote }
    }

    /// Create a category, routed through the offline-aware writer.
    ///
    /// A freshly minted ID cannot be the target of any existing parent link,
    /// so creation alone can never introduce a cycle; only the parent's
    /// existence needs checking. That check is best-effort: when the remote
    /// cannot be queried (offline) the category is queued anyway rather
    /// than blocking capture.
    pub async fn create(&self, new: NewCategory) -> Result<(Category, WriteOutcome)> {
        let name = normalize_text_option(Some(new.name))
            .ok_or_else(|| Error::InvalidInput("Category name must not be empty".to_string()))?;

        let mut category = Category::new(name, new.owner);
        if let Some(parent) = new.parent {
            match self.list(&category.owner).await {
                Ok(existing) => {
                    if !existing.iter().any(|c| c.id == parent) {
                        return Err(Error::NotFound(format!(
                            "Parent category {parent} does not exist"
                        )));
                    }
                }
                Err(error) => {
                    tracing::debug!(%error, "parent existence check skipped, remote unreachable");
                }
            }
            category = category.with_parent(parent);
        }
        if let Some(url) = normalize_text_option(new.image_url) {
            category = category.with_image_url(url);
        }

        let outcome = self
            .router
            .save(RecordKind::Category, record_payload(&category)?)
            .await?;
        Ok((category, outcome))
    }

    /// All categories belonging to `owner`
    pub async fn list(&self, owner: &str) -> Result<Vec<Category>> {
        let rows = self
            .remote
            .query(RecordKind::Category, "owner", &serde_json::json!(owner))
            .await?;
        Ok(parse_records(RecordKind::Category, rows))
    }

    /// Direct children of `parent` (`None` for top-level categories)
    pub async fn subcategories(
        &self,
        owner: &str,
        parent: Option<CategoryId>,
    ) -> Result<Vec<Category>> {
        let mut categories = self.list(owner).await?;
        categories.retain(|category| category.parent == parent);
        Ok(categories)
    }

    /// Move a category under a new parent, preserving the forest invariant.
    ///
    /// Requires the remote store: reparenting without being able to see the
    /// current hierarchy could silently create a cycle.
    pub async fn reparent(
        &self,
        owner: &str,
        id: CategoryId,
        new_parent: Option<CategoryId>,
    ) -> Result<()> {
        let categories = self.list(owner).await?;
        if !categories.iter().any(|c| c.id == id) {
            return Err(Error::NotFound(format!("Category {id} does not exist")));
        }
        ensure_acyclic(&categories, id, new_parent)?;

        let mut payload = crate::remote::JsonMap::new();
        payload.insert("parent".to_string(), serde_json::to_value(new_parent)?);
        self.remote
            .update(RecordKind::Category, &id.as_str(), &payload)
            .await
    }
}

/// Check that pointing `child` at `new_parent` keeps the owner's categories
/// a forest.
///
/// Walks the parent chain from `new_parent` upward: reaching `child` means
/// the move would close a cycle; a repeated ID means the stored data is
/// already cyclic and must not be made worse.
pub fn ensure_acyclic(
    categories: &[Category],
    child: CategoryId,
    new_parent: Option<CategoryId>,
) -> Result<()> {
    let by_id: HashMap<CategoryId, &Category> =
        categories.iter().map(|c| (c.id, c)).collect();

    let mut seen = HashSet::new();
    let mut cursor = new_parent;
    while let Some(current) = cursor {
        if current == child {
            return Err(Error::CategoryCycle(format!(
                "{child} cannot be moved under its own descendant"
            )));
        }
        if !seen.insert(current) {
            return Err(Error::CategoryCycle(format!(
                "existing parent chain through {current} already contains a cycle"
            )));
        }
        cursor = by_id
            .get(&current)
            .ok_or_else(|| Error::NotFound(format!("Parent category {current} does not exist")))?
            .parent;
    }
    Ok(())
}
