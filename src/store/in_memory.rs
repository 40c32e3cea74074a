use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::RegistryError;
use crate::feed::FeedRecord;

use super::FeedStore;

/// In-memory feed store for testing and development.
///
/// Clone-friendly (cloning shares the same snapshot and write counter).
#[derive(Clone, Default)]
pub struct InMemoryFeedStore {
    snapshot: Arc<RwLock<Vec<FeedRecord>>>,
    writes: Arc<AtomicU64>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an existing snapshot, as if written by an earlier run.
    pub fn with_feeds(feeds: Vec<FeedRecord>) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(feeds)),
            writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of snapshot writes performed so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FeedStore for InMemoryFeedStore {
    fn load_feeds(&self) -> Result<Vec<FeedRecord>, RegistryError> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| RegistryError::LockPoisoned("feed store read"))?;
        Ok(snapshot.clone())
    }

    fn save_feeds(&self, feeds: &[&FeedRecord]) -> Result<(), RegistryError> {
        let mut snapshot = self
            .snapshot
            .write()
            .map_err(|_| RegistryError::LockPoisoned("feed store write"))?;
        *snapshot = feeds.iter().map(|feed| (*feed).clone()).collect();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
