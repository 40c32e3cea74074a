//! Round trips through the flat-file store, in both encodings.

use feed_registry::{
    Category, CategoryProvider, CategoryRef, FeedRecord, FeedRegistry, FeedState, FeedStore,
    FileFeedStore, InMemoryCategoryProvider, InMemoryTemplateProvider, RegistryConfig,
    RegistryError, StoreFormat,
};
use tempfile::TempDir;

fn categories() -> InMemoryCategoryProvider {
    let categories = InMemoryCategoryProvider::new();
    categories.insert(Category::new("c1", "Sales")).unwrap();
    categories.insert(Category::new("c2", "Marketing")).unwrap();
    categories
}

fn category(provider: &InMemoryCategoryProvider, id: &str) -> Category {
    provider.category_by_id(id).unwrap().unwrap()
}

fn file_registry(
    store: FileFeedStore,
    categories: &InMemoryCategoryProvider,
) -> FeedRegistry<FileFeedStore, InMemoryCategoryProvider, InMemoryTemplateProvider> {
    let registry = FeedRegistry::new(store, categories.clone(), InMemoryTemplateProvider::new());
    registry.initialize().unwrap();
    registry
}

fn restart_keeps_feeds(format: StoreFormat) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("feeds.db");
    let original = categories();

    let registry = file_registry(FileFeedStore::new(&path, format), &original);
    let orders = registry
        .save(
            FeedRecord::new("Orders", "t1")
                .with_category(CategoryRef::by_id("c1"))
                .with_description("nightly order export"),
        )
        .unwrap();
    let clicks = registry
        .save(FeedRecord::new("Clicks", "t2").with_category(CategoryRef::by_name("marketing")))
        .unwrap();
    registry.enable(clicks.id().unwrap()).unwrap();
    registry.save(orders.clone()).unwrap();
    drop(registry);

    assert!(path.exists());
    assert!(!path.with_file_name("feeds.db.tmp").exists());

    let fresh = categories();
    let reloaded = file_registry(FileFeedStore::new(&path, format), &fresh);
    assert_eq!(reloaded.len().unwrap(), 2);

    let orders = reloaded.feed_by_id(orders.id().unwrap()).unwrap().unwrap();
    assert_eq!(orders.version, 2);
    assert_eq!(orders.description.as_deref(), Some("nightly order export"));
    assert_eq!(orders.system_feed_name, "orders");
    assert!(orders.category().unwrap().ptr_eq(&category(&fresh, "c1")));

    let clicks = reloaded.feed_by_name("clicks").unwrap().unwrap();
    assert_eq!(clicks.state, FeedState::Enabled);
    assert_eq!(clicks.category.id.as_deref(), Some("c2"));
    assert_eq!(category(&fresh, "c2").related_feeds().unwrap().len(), 1);
}

#[test]
fn json_store_survives_restart() {
    restart_keeps_feeds(StoreFormat::Json);
}

#[test]
fn bitcode_store_survives_restart() {
    restart_keeps_feeds(StoreFormat::Bitcode);
}

#[test]
fn missing_or_blank_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feeds.json");
    let store = FileFeedStore::new(&path, StoreFormat::Json);
    assert!(store.load_feeds().unwrap().is_empty());

    std::fs::write(&path, "  \n").unwrap();
    assert!(store.load_feeds().unwrap().is_empty());
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feeds.json");
    std::fs::write(&path, "{not json").unwrap();

    let registry = FeedRegistry::new(
        FileFeedStore::new(&path, StoreFormat::Json),
        categories(),
        InMemoryTemplateProvider::new(),
    );
    assert!(matches!(registry.initialize(), Err(RegistryError::Serde(_))));
    assert!(registry.is_empty().unwrap());
}

#[test]
fn json_snapshot_is_sorted_and_omits_live_links() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feeds.json");
    let registry = file_registry(FileFeedStore::new(&path, StoreFormat::Json), &categories());

    registry
        .save(FeedRecord::new("b", "t1").with_id("ignored").with_category(CategoryRef::by_id("c1")))
        .unwrap();
    registry
        .save(FeedRecord::new("a", "t1").with_category(CategoryRef::by_id("c2")))
        .unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(values.len(), 2);

    let ids: Vec<&str> = values.iter().map(|v| v["id"].as_str().unwrap()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);

    assert!(!raw.contains("linked_category"));
    assert!(raw.contains("\"state\": \"DISABLED\""));
    assert!(values[0]["category"]["system_name"].is_string());
}

#[test]
fn store_built_from_config() {
    let dir = TempDir::new().unwrap();
    let config = RegistryConfig::default()
        .with_store_path(dir.path().join("feeds.bin"))
        .with_store_format(StoreFormat::Bitcode);

    let store = FileFeedStore::from_config(&config);
    assert_eq!(store.path(), dir.path().join("feeds.bin").as_path());

    let registry = FeedRegistry::new(store, categories(), InMemoryTemplateProvider::new())
        .with_config(config);
    registry.initialize().unwrap();
    registry
        .save(FeedRecord::new("orders", "t1").with_category(CategoryRef::by_id("c1")))
        .unwrap();

    let records = FileFeedStore::new(dir.path().join("feeds.bin"), StoreFormat::Bitcode)
        .load_feeds()
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].feed_name, "orders");
}
