//! FeedRegistry - the in-memory map of feeds and its links to collaborators.
//!
//! Every write runs under the map's write lock and includes the full snapshot
//! write, so writers never interleave partial snapshots. Reads resolve the
//! live category and a property-free template snapshot on demand.
//!
//! ## Example
//!
//! ```ignore
//! use feed_registry::{
//!     CategoryRef, FeedRecord, FeedRegistry, InMemoryCategoryProvider,
//!     InMemoryFeedStore, InMemoryTemplateProvider,
//! };
//!
//! let registry = FeedRegistry::new(
//!     InMemoryFeedStore::new(),
//!     InMemoryCategoryProvider::new(),
//!     InMemoryTemplateProvider::new(),
//! );
//! registry.initialize()?;
//!
//! let saved = registry.save(
//!     FeedRecord::new("ingest-a", "t1").with_category(CategoryRef::by_id("cat1")),
//! )?;
//! let loaded = registry.feed_by_id(saved.id().unwrap())?;
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::category::{Category, CategoryProvider};
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::events::{
    FeedEventPublisher, FeedsRetagged, FEEDS_RETAGGED, FEED_DISABLED, FEED_ENABLED, FEED_SAVED,
};
use crate::feed::{feed_name_key, system_name, CategoryRef, FeedRecord, FeedState, FeedSummary};
use crate::store::FeedStore;
use crate::template::{RegisteredTemplate, TemplateProvider};

/// Result of [`FeedRegistry::listing`].
#[derive(Debug, Clone)]
pub enum FeedListing {
    Full(Vec<FeedRecord>),
    Summaries(Vec<FeedSummary>),
}

impl FeedListing {
    pub fn len(&self) -> usize {
        match self {
            FeedListing::Full(feeds) => feeds.len(),
            FeedListing::Summaries(summaries) => summaries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct FeedRegistry<S, C, T> {
    feeds: RwLock<HashMap<String, FeedRecord>>,
    store: S,
    categories: C,
    templates: T,
    config: RegistryConfig,
    publisher: Option<Mutex<Box<dyn FeedEventPublisher>>>,
}

impl<S, C, T> FeedRegistry<S, C, T> {
    /// Create an empty registry. Call [`FeedRegistry::initialize`] to load the store.
    pub fn new(store: S, categories: C, templates: T) -> Self {
        FeedRegistry {
            feeds: RwLock::new(HashMap::new()),
            store,
            categories,
            templates,
            config: RegistryConfig::default(),
            publisher: None,
        }
    }

    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish lifecycle events to `publisher` after each persisted change.
    pub fn with_publisher(mut self, publisher: impl FeedEventPublisher + 'static) -> Self {
        self.publisher = Some(Mutex::new(Box::new(publisher)));
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Access the underlying feed store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_feeds(&self) -> Result<RwLockReadGuard<'_, HashMap<String, FeedRecord>>, RegistryError> {
        self.feeds
            .read()
            .map_err(|_| RegistryError::LockPoisoned("feeds read"))
    }

    fn write_feeds(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, FeedRecord>>, RegistryError> {
        self.feeds
            .write()
            .map_err(|_| RegistryError::LockPoisoned("feeds write"))
    }

    fn publish(&self, event_type: &str, payload: &impl Serialize) {
        let Some(publisher) = &self.publisher else {
            return;
        };
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(event_type, error = %err, "could not encode feed event");
                return;
            }
        };
        match publisher.lock() {
            Ok(mut publisher) => {
                if let Err(err) = publisher.publish(event_type, &bytes) {
                    warn!(event_type, error = %err, "feed event publish failed");
                }
            }
            Err(_) => warn!(event_type, "feed event publisher poisoned"),
        }
    }
}

// ============================================================================
// startup rehydration
// ============================================================================

impl<S, C, T> FeedRegistry<S, C, T>
where
    S: FeedStore,
    C: CategoryProvider,
    T: TemplateProvider,
{
    /// Load every persisted feed, re-link it to its live category and register
    /// it in the map. Returns the number of feeds loaded.
    ///
    /// Nothing is linked or stored unless every category reference resolves.
    /// Engine ids are cleared so feeds get re-registered lazily on next use.
    pub fn initialize(&self) -> Result<usize, RegistryError> {
        let mut feeds = self.write_feeds()?;
        let saved = self.store.load_feeds()?;

        let mut loaded = HashMap::with_capacity(saved.len());
        for mut feed in saved {
            let id = feed.id.clone().ok_or_else(|| {
                RegistryError::Persistence(format!("stored feed {} has no id", feed.feed_name))
            })?;

            if !feed.category.is_empty() {
                let category = self.resolve_stored_category(&feed.category)?.ok_or_else(|| {
                    RegistryError::UnresolvableCategory {
                        feed_id: id.clone(),
                        category_id: category_key(&feed.category),
                    }
                })?;
                feed.attach_category(category);
            }

            loaded.insert(id, feed);
        }

        for feed in loaded.values_mut() {
            if let Some(category) = feed.category() {
                category.link_feed(FeedSummary::from(&*feed))?;
            }
            feed.engine_feed_id = None;
        }

        let count = loaded.len();
        *feeds = loaded;
        info!(count, "rehydrated feeds from store");
        Ok(count)
    }

    /// A stored id is authoritative: it resolves by id or not at all. The name
    /// is only consulted for records persisted without an id.
    fn resolve_stored_category(
        &self,
        reference: &CategoryRef,
    ) -> Result<Option<Category>, RegistryError> {
        match reference.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => self.categories.category_by_id(id),
            None => self.resolve_category(reference),
        }
    }

    fn resolve_category(&self, reference: &CategoryRef) -> Result<Option<Category>, RegistryError> {
        if let Some(id) = reference.id.as_deref().filter(|id| !id.is_empty()) {
            if let Some(category) = self.categories.category_by_id(id)? {
                return Ok(Some(category));
            }
        }
        match reference.name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => self.categories.category_by_name(name),
            None => Ok(None),
        }
    }
}

// ============================================================================
// lookups
// ============================================================================

impl<S, C, T> FeedRegistry<S, C, T>
where
    S: FeedStore,
    C: CategoryProvider,
    T: TemplateProvider,
{
    /// Every stored feed, in no particular order.
    pub fn feeds(&self) -> Result<Vec<FeedRecord>, RegistryError> {
        Ok(self.read_feeds()?.values().cloned().collect())
    }

    /// Full records when `verbose`, summaries otherwise.
    pub fn listing(&self, verbose: bool) -> Result<FeedListing, RegistryError> {
        if verbose {
            Ok(FeedListing::Full(self.feeds()?))
        } else {
            Ok(FeedListing::Summaries(self.summaries()?))
        }
    }

    pub fn summaries(&self) -> Result<Vec<FeedSummary>, RegistryError> {
        Ok(self.read_feeds()?.values().map(FeedSummary::from).collect())
    }

    /// Feeds flagged as reusable flows.
    pub fn reusable_feeds(&self) -> Result<Vec<FeedRecord>, RegistryError> {
        Ok(self
            .read_feeds()?
            .values()
            .filter(|feed| feed.reusable)
            .cloned()
            .collect())
    }

    /// The category's own related-feeds list; empty if the category is unknown.
    pub fn summaries_for_category(&self, category_id: &str) -> Result<Vec<FeedSummary>, RegistryError> {
        match self.categories.category_by_id(category_id)? {
            Some(category) => category.related_feeds(),
            None => Ok(Vec::new()),
        }
    }

    /// Case-insensitive name match. Duplicate names resolve to the smallest id.
    pub fn feed_by_name(&self, name: &str) -> Result<Option<FeedRecord>, RegistryError> {
        let wanted = name.to_lowercase();
        Ok(self
            .read_feeds()?
            .values()
            .filter(|feed| feed.feed_name.to_lowercase() == wanted)
            .min_by(|a, b| a.id.cmp(&b.id))
            .cloned())
    }

    /// Look up a feed, refreshing its category and template links first.
    ///
    /// The attached template never carries properties, and the feed's
    /// template id is rewritten to the engine-side id of the resolved template.
    pub fn feed_by_id(&self, id: &str) -> Result<Option<FeedRecord>, RegistryError> {
        let mut feeds = self.write_feeds()?;
        let Some(feed) = feeds.get_mut(id) else {
            return Ok(None);
        };
        self.refresh_references(feed)?;
        Ok(Some(feed.clone()))
    }

    /// Feeds whose template id matches, ignoring case.
    pub fn feeds_with_template(&self, template_id: &str) -> Result<Vec<FeedRecord>, RegistryError> {
        Ok(self
            .read_feeds()?
            .values()
            .filter(|feed| feed.template_id.eq_ignore_ascii_case(template_id))
            .cloned()
            .collect())
    }

    /// `"<category>.<feed>"` system-name keys of every stored feed, sorted.
    pub fn feed_names(&self) -> Result<Vec<String>, RegistryError> {
        let mut names: Vec<String> = self
            .read_feeds()?
            .values()
            .map(|feed| FeedSummary::from(feed).category_and_feed_name())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Whether a feed with this system name already exists in the category.
    pub fn is_feed_name_taken(
        &self,
        category_system_name: &str,
        system_feed_name: &str,
    ) -> Result<bool, RegistryError> {
        let wanted = feed_name_key(category_system_name, system_feed_name);
        Ok(self
            .read_feeds()?
            .values()
            .any(|feed| FeedSummary::from(feed).category_and_feed_name() == wanted))
    }

    /// Full template, properties included, for callers building a feed.
    pub fn template_with_all_properties(
        &self,
        template_id: &str,
    ) -> Result<Option<RegisteredTemplate>, RegistryError> {
        self.templates.template_with_all_properties(template_id)
    }

    pub fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.read_feeds()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.read_feeds()?.is_empty())
    }

    fn refresh_references(&self, feed: &mut FeedRecord) -> Result<(), RegistryError> {
        if let Some(category_id) = feed.category.id.clone() {
            match self.categories.category_by_id(&category_id)? {
                Some(category) => feed.attach_category(category),
                None => {
                    warn!(feed_id = ?feed.id, %category_id, "feed category no longer resolves");
                    feed.detach_category();
                }
            }
        }

        let mut template = self.templates.template_by_id(&feed.template_id)?;
        if template.is_none() {
            if let Some(name) = feed.template_name.as_deref() {
                template = self.templates.template_by_name(name)?;
            }
        }
        if let Some(template) = template {
            let retagged = feed.template_id != template.engine_template_id;
            feed.attach_template(template.without_properties());
            if retagged {
                if let Some(category) = feed.category() {
                    category.link_feed(FeedSummary::from(&*feed))?;
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// writes
// ============================================================================

impl<S, C, T> FeedRegistry<S, C, T>
where
    S: FeedStore,
    C: CategoryProvider,
    T: TemplateProvider,
{
    /// Create or update a feed and persist the whole collection.
    ///
    /// A feed without an id, or with an id the registry does not know, gets a
    /// fresh id and version 1. Otherwise it replaces the stored feed and its
    /// version becomes the stored version plus one. The state is owned by
    /// [`FeedRegistry::enable`] and [`FeedRegistry::disable`]; whatever the
    /// caller sends is ignored. The category is resolved
    /// by id, then by name; a feed whose category does not resolve is stored
    /// without one.
    pub fn save(&self, mut feed: FeedRecord) -> Result<FeedRecord, RegistryError> {
        feed.validate()?;
        if feed.system_feed_name.trim().is_empty() {
            feed.system_feed_name = system_name(&feed.feed_name);
        }

        let mut feeds = self.write_feeds()?;
        let known_id = feed.id.clone().filter(|id| feeds.contains_key(id));
        let previous = known_id.as_ref().and_then(|id| feeds.get(id)).cloned();
        let id = known_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        feed.id = Some(id.clone());
        feed.version = previous.as_ref().map_or(1, |stored| stored.version + 1);
        feed.state = previous.as_ref().map_or_else(FeedState::default, |stored| stored.state);

        let category = self.resolve_category(&feed.category)?;
        match &category {
            Some(category) => feed.attach_category(category.clone()),
            None => {
                warn!(feed_id = %id, category = ?feed.category, "feed category not found, storing without one");
                feed.clear_category();
            }
        }

        let displaced = feeds.insert(id.clone(), feed.clone());
        if let Err(err) = self.persist(&feeds) {
            match displaced {
                Some(stored) => feeds.insert(id, stored),
                None => feeds.remove(&id),
            };
            return Err(err);
        }

        let summary = FeedSummary::from(&feed);
        if let Some(old) = previous.as_ref().and_then(FeedRecord::category) {
            if !category.as_ref().is_some_and(|new| new.ptr_eq(old)) {
                old.unlink_feed(&id)?;
            }
        }
        if let Some(category) = &category {
            category.link_feed(summary.clone())?;
        }
        drop(feeds);

        debug!(feed_id = %id, version = feed.version, "saved feed");
        self.publish(FEED_SAVED, &summary);
        Ok(feed)
    }

    /// Point every feed using `old_template_id` at `new_template_id`.
    ///
    /// Persists once when anything changed, not at all otherwise. Returns the
    /// number of feeds retagged.
    pub fn retag_template(
        &self,
        old_template_id: &str,
        new_template_id: &str,
    ) -> Result<usize, RegistryError> {
        let mut feeds = self.write_feeds()?;
        let mut retagged = Vec::new();
        for (id, feed) in feeds.iter_mut() {
            if feed.template_id.eq_ignore_ascii_case(old_template_id) {
                let previous = std::mem::replace(&mut feed.template_id, new_template_id.to_string());
                retagged.push((id.clone(), previous));
            }
        }
        if retagged.is_empty() {
            return Ok(0);
        }

        if let Err(err) = self.persist(&feeds) {
            for (id, previous) in retagged {
                if let Some(feed) = feeds.get_mut(&id) {
                    feed.template_id = previous;
                }
            }
            return Err(err);
        }
        drop(feeds);

        let event = FeedsRetagged {
            old_template_id: old_template_id.to_string(),
            new_template_id: new_template_id.to_string(),
            feed_ids: retagged.into_iter().map(|(id, _)| id).collect(),
        };
        info!(
            old_template_id,
            new_template_id,
            count = event.feed_ids.len(),
            "retagged feeds to new template"
        );
        self.publish(FEEDS_RETAGGED, &event);
        Ok(event.feed_ids.len())
    }

    /// Enable a feed. Returns its summary, or None if the id is unknown.
    pub fn enable(&self, id: &str) -> Result<Option<FeedSummary>, RegistryError> {
        self.set_state(id, FeedState::Enabled)
    }

    /// Disable a feed. Returns its summary, or None if the id is unknown.
    pub fn disable(&self, id: &str) -> Result<Option<FeedSummary>, RegistryError> {
        self.set_state(id, FeedState::Disabled)
    }

    fn set_state(&self, id: &str, state: FeedState) -> Result<Option<FeedSummary>, RegistryError> {
        let mut feeds = self.write_feeds()?;
        let Some(feed) = feeds.get_mut(id) else {
            return Ok(None);
        };
        self.refresh_references(feed)?;
        let prior = std::mem::replace(&mut feed.state, state);
        let summary = FeedSummary::from(&*feed);
        let category = feed.category().cloned();

        if self.config.persist_state_changes {
            if let Err(err) = self.persist(&feeds) {
                if let Some(feed) = feeds.get_mut(id) {
                    feed.state = prior;
                }
                return Err(err);
            }
        }
        if let Some(category) = category {
            category.link_feed(summary.clone())?;
        }
        drop(feeds);

        debug!(feed_id = %id, %state, persisted = self.config.persist_state_changes, "changed feed state");
        let event_type = match state {
            FeedState::Enabled => FEED_ENABLED,
            FeedState::Disabled => FEED_DISABLED,
        };
        self.publish(event_type, &summary);
        Ok(Some(summary))
    }

    fn persist(&self, feeds: &HashMap<String, FeedRecord>) -> Result<(), RegistryError> {
        let snapshot: Vec<&FeedRecord> = feeds.values().collect();
        self.store.save_feeds(&snapshot)
    }
}

fn category_key(reference: &CategoryRef) -> String {
    reference
        .id
        .clone()
        .or_else(|| reference.name.clone())
        .unwrap_or_default()
}
