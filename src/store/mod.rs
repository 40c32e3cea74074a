//! Feed stores - whole-collection persistence for the registry.
//!
//! A store loads every feed on startup and overwrites the full collection on
//! each write; there is no partial-update mode.

mod file;
mod in_memory;

use crate::error::RegistryError;
use crate::feed::FeedRecord;

pub use file::FileFeedStore;
pub use in_memory::InMemoryFeedStore;

pub trait FeedStore: Send + Sync {
    /// Load every persisted feed. Empty on first run.
    fn load_feeds(&self) -> Result<Vec<FeedRecord>, RegistryError>;

    /// Replace the persisted collection with `feeds`.
    fn save_feeds(&self, feeds: &[&FeedRecord]) -> Result<(), RegistryError>;
}
