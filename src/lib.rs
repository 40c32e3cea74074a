mod category;
mod config;
mod error;
mod events;
mod feed;
mod registry;
mod store;
mod template;

pub mod logging;

pub use category::{Category, CategoryProvider, InMemoryCategoryProvider};
pub use config::{
    RegistryConfig, StoreFormat, ENV_PERSIST_STATE, ENV_STORE_FORMAT, ENV_STORE_PATH,
};
pub use error::RegistryError;
pub use events::{
    FeedEventPublisher, FeedsRetagged, LogPublisher, FEEDS_RETAGGED, FEED_DISABLED, FEED_ENABLED,
    FEED_SAVED,
};
#[cfg(feature = "emitter")]
pub use events::LocalEmitterPublisher;
pub use feed::{feed_name_key, system_name, CategoryRef, FeedRecord, FeedState, FeedSummary};
pub use registry::{FeedListing, FeedRegistry};
pub use store::{FeedStore, FileFeedStore, InMemoryFeedStore};
pub use template::{
    InMemoryTemplateProvider, RegisteredTemplate, TemplateProperty, TemplateProvider,
};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
