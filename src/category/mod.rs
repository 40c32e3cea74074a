//! Categories - groupings that keep a list of their member feeds.
//!
//! A [`Category`] is a cheap, clone-friendly handle. Clones share the same
//! related-feeds list, so a summary linked through one handle is visible
//! through every other handle the [`CategoryProvider`] gave out.

mod in_memory;

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::RegistryError;
use crate::feed::{system_name, CategoryRef, FeedSummary};

pub use in_memory::InMemoryCategoryProvider;

/// Resolves category references to live category handles.
pub trait CategoryProvider: Send + Sync {
    /// Look up a category by id. Returns None if not found.
    fn category_by_id(&self, id: &str) -> Result<Option<Category>, RegistryError>;

    /// Look up a category by display name. Returns None if not found.
    fn category_by_name(&self, name: &str) -> Result<Option<Category>, RegistryError>;
}

struct CategoryInner {
    id: String,
    name: String,
    system_name: String,
    related_feeds: RwLock<Vec<FeedSummary>>,
}

#[derive(Clone)]
pub struct Category {
    inner: Arc<CategoryInner>,
}

impl Category {
    /// Create a category whose system name is derived from `name`.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let derived = system_name(&name);
        Self::with_system_name(id, name, derived)
    }

    pub fn with_system_name(
        id: impl Into<String>,
        name: impl Into<String>,
        system_name: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(CategoryInner {
                id: id.into(),
                name: name.into(),
                system_name: system_name.into(),
                related_feeds: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn system_name(&self) -> &str {
        &self.inner.system_name
    }

    /// True when both handles point at the same category instance.
    pub fn ptr_eq(&self, other: &Category) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: Some(self.inner.id.clone()),
            name: Some(self.inner.name.clone()),
            system_name: Some(self.inner.system_name.clone()),
        }
    }

    /// Snapshot of the summaries of every feed linked to this category.
    pub fn related_feeds(&self) -> Result<Vec<FeedSummary>, RegistryError> {
        let feeds = self
            .inner
            .related_feeds
            .read()
            .map_err(|_| RegistryError::LockPoisoned("category read"))?;
        Ok(feeds.clone())
    }

    /// Link a feed summary, replacing any earlier summary of the same feed.
    pub fn link_feed(&self, summary: FeedSummary) -> Result<(), RegistryError> {
        let mut feeds = self
            .inner
            .related_feeds
            .write()
            .map_err(|_| RegistryError::LockPoisoned("category write"))?;
        match feeds.iter_mut().find(|existing| existing.id == summary.id) {
            Some(existing) => *existing = summary,
            None => feeds.push(summary),
        }
        Ok(())
    }

    /// Remove a feed's summary. Returns true if one was linked.
    pub fn unlink_feed(&self, feed_id: &str) -> Result<bool, RegistryError> {
        let mut feeds = self
            .inner
            .related_feeds
            .write()
            .map_err(|_| RegistryError::LockPoisoned("category write"))?;
        let before = feeds.len();
        feeds.retain(|summary| summary.id != feed_id);
        Ok(feeds.len() != before)
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("system_name", &self.inner.system_name)
            .finish_non_exhaustive()
    }
}
