//! Feed records and the views derived from them.
//!
//! A [`FeedRecord`] is the persisted description of one ingestion job. The
//! registry owns records; [`FeedSummary`] is the projection handed to listings
//! and kept on each category's related-feeds list.

mod naming;
mod record;
mod summary;

pub use naming::{feed_name_key, system_name};
pub use record::{CategoryRef, FeedRecord, FeedState};
pub use summary::FeedSummary;
