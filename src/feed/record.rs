use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::RegistryError;
use crate::template::RegisteredTemplate;

/// Whether a feed is scheduled to run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedState {
    Enabled,
    #[default]
    Disabled,
}

impl fmt::Display for FeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedState::Enabled => write!(f, "ENABLED"),
            FeedState::Disabled => write!(f, "DISABLED"),
        }
    }
}

/// The category a feed points at, as persisted and as supplied by callers.
///
/// Either field may identify the category; the registry resolves it to the
/// live [`Category`] on every save and lookup.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Option<String>,
    pub name: Option<String>,
    pub system_name: Option<String>,
}

impl CategoryRef {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        is_blank(self.id.as_deref()) && is_blank(self.name.as_deref())
    }
}

/// A configured data-ingestion job derived from a registered template.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedRecord {
    /// Assigned by the registry on first save.
    pub id: Option<String>,
    pub feed_name: String,
    pub system_feed_name: String,
    pub description: Option<String>,
    /// Starts at 1 and grows by one on every save. Never set by callers.
    pub version: u64,
    pub template_id: String,
    pub template_name: Option<String>,
    pub category: CategoryRef,
    pub state: FeedState,
    /// Marks the feed as a reusable flow that other feeds connect to.
    pub reusable: bool,
    /// Id assigned by the workflow engine at runtime. Cleared on startup.
    pub engine_feed_id: Option<String>,
    #[serde(skip)]
    linked_category: Option<Category>,
    #[serde(skip)]
    registered_template: Option<RegisteredTemplate>,
}

impl FeedRecord {
    pub fn new(feed_name: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            feed_name: feed_name.into(),
            template_id: template_id.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: CategoryRef) -> Self {
        self.category = category;
        self
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_state(mut self, state: FeedState) -> Self {
        self.state = state;
        self
    }

    pub fn with_reusable(mut self, reusable: bool) -> Self {
        self.reusable = reusable;
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The live category this feed is attached to, if it resolved.
    pub fn category(&self) -> Option<&Category> {
        self.linked_category.as_ref()
    }

    /// Property-free snapshot of the template, attached by id lookups.
    pub fn registered_template(&self) -> Option<&RegisteredTemplate> {
        self.registered_template.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.state == FeedState::Enabled
    }

    /// Check the fields needed before a feed can be registered.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.feed_name.trim().is_empty() {
            return Err(RegistryError::InvalidFeed("feed name is required".into()));
        }
        if self.template_id.trim().is_empty() && is_blank(self.template_name.as_deref()) {
            return Err(RegistryError::InvalidFeed(format!(
                "feed {} has no template reference",
                self.feed_name
            )));
        }
        if self.category.is_empty() {
            return Err(RegistryError::InvalidFeed(format!(
                "feed {} has no category reference",
                self.feed_name
            )));
        }
        Ok(())
    }

    pub(crate) fn attach_category(&mut self, category: Category) {
        self.category = category.to_ref();
        self.linked_category = Some(category);
    }

    pub(crate) fn clear_category(&mut self) {
        self.category = CategoryRef::default();
        self.linked_category = None;
    }

    pub(crate) fn detach_category(&mut self) {
        self.linked_category = None;
    }

    pub(crate) fn attach_template(&mut self, template: RegisteredTemplate) {
        self.template_id = template.engine_template_id.clone();
        self.registered_template = Some(template);
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
