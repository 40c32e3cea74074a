use serde::{Deserialize, Serialize};

use super::naming::feed_name_key;
use super::record::{FeedRecord, FeedState};

/// Lightweight listing view of a [`FeedRecord`], built on demand.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSummary {
    pub id: String,
    pub feed_name: String,
    pub system_feed_name: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub category_system_name: Option<String>,
    pub template_id: String,
    pub template_name: Option<String>,
    pub state: FeedState,
    pub version: u64,
    pub reusable: bool,
}

impl FeedSummary {
    /// `"<category>.<feed>"` key of the system names.
    pub fn category_and_feed_name(&self) -> String {
        feed_name_key(
            self.category_system_name.as_deref().unwrap_or_default(),
            &self.system_feed_name,
        )
    }
}

impl From<&FeedRecord> for FeedSummary {
    fn from(feed: &FeedRecord) -> Self {
        Self {
            id: feed.id.clone().unwrap_or_default(),
            feed_name: feed.feed_name.clone(),
            system_feed_name: feed.system_feed_name.clone(),
            category_id: feed.category.id.clone(),
            category_name: feed.category.name.clone(),
            category_system_name: feed.category.system_name.clone(),
            template_id: feed.template_id.clone(),
            template_name: feed.template_name.clone(),
            state: feed.state,
            version: feed.version,
            reusable: feed.reusable,
        }
    }
}
