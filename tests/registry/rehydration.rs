use feed_registry::{
    CategoryRef, FeedRecord, FeedRegistry, FeedState, InMemoryFeedStore, RegistryError,
};

use crate::support::Fixture;

fn stored(id: &str, name: &str, category: CategoryRef) -> FeedRecord {
    let mut feed = FeedRecord::new(name, "t1")
        .with_id(id)
        .with_category(category)
        .with_state(FeedState::Enabled);
    feed.version = 3;
    feed.engine_feed_id = Some(format!("engine-{}", id));
    feed
}

#[test]
fn initialize_links_feeds_to_live_categories() {
    let fixture = Fixture::new();
    let store = InMemoryFeedStore::with_feeds(vec![
        stored("f1", "orders", CategoryRef::by_id("c1")),
        stored("f2", "clicks", CategoryRef::by_name("CATB")),
    ]);
    let registry = FeedRegistry::new(store, fixture.categories.clone(), fixture.templates.clone());

    assert_eq!(registry.initialize().unwrap(), 2);

    let orders = registry.feed_by_id("f1").unwrap().unwrap();
    assert!(orders.category().unwrap().ptr_eq(&fixture.category("c1")));
    assert_eq!(orders.version, 3);
    assert_eq!(orders.state, FeedState::Enabled);
    assert!(orders.engine_feed_id.is_none());

    let clicks = registry.feed_by_name("clicks").unwrap().unwrap();
    assert_eq!(clicks.category.id.as_deref(), Some("c2"));

    assert_eq!(registry.summaries_for_category("c1").unwrap().len(), 1);
    assert_eq!(registry.summaries_for_category("c2").unwrap()[0].id, "f2");
    assert_eq!(registry.store().write_count(), 0);
}

#[test]
fn initialize_keeps_feeds_stored_without_category() {
    let fixture = Fixture::new();
    let store = InMemoryFeedStore::with_feeds(vec![stored("f1", "loose", CategoryRef::default())]);
    let registry = FeedRegistry::new(store, fixture.categories.clone(), fixture.templates.clone());

    assert_eq!(registry.initialize().unwrap(), 1);
    assert!(registry.feed_by_id("f1").unwrap().unwrap().category().is_none());
}

#[test]
fn initialize_fails_whole_when_a_category_is_missing() {
    let fixture = Fixture::new();
    let store = InMemoryFeedStore::with_feeds(vec![
        stored("f1", "orders", CategoryRef::by_id("c1")),
        stored("f2", "ghost", CategoryRef::by_id("deleted")),
    ]);
    let registry = FeedRegistry::new(store, fixture.categories.clone(), fixture.templates.clone());

    let err = registry.initialize().unwrap_err();
    assert_eq!(
        err,
        RegistryError::UnresolvableCategory {
            feed_id: "f2".into(),
            category_id: "deleted".into(),
        }
    );
    assert!(registry.is_empty().unwrap());
    assert!(fixture.category("c1").related_feeds().unwrap().is_empty());
}

#[test]
fn initialize_rejects_stored_feed_without_id() {
    let fixture = Fixture::new();
    let store = InMemoryFeedStore::with_feeds(vec![
        FeedRecord::new("anonymous", "t1").with_category(CategoryRef::by_id("c1")),
    ]);
    let registry = FeedRegistry::new(store, fixture.categories.clone(), fixture.templates.clone());

    assert!(matches!(
        registry.initialize(),
        Err(RegistryError::Persistence(_))
    ));
}

#[test]
fn saves_after_restart_continue_versioning() {
    let fixture = Fixture::new();
    let first = fixture.registry();
    let saved = first.save(crate::support::feed_in("orders", "c1", "t1")).unwrap();
    drop(first);

    let second = fixture.registry();
    let resaved = second.save(saved).unwrap();
    assert_eq!(resaved.version, 2);
    assert_eq!(second.len().unwrap(), 1);
}

#[test]
fn stored_category_id_is_not_rebound_by_name() {
    let fixture = Fixture::new();
    let store = InMemoryFeedStore::with_feeds(vec![stored(
        "f1",
        "orders",
        CategoryRef {
            id: Some("deleted".into()),
            name: Some("catA".into()),
            system_name: None,
        },
    )]);
    let registry = FeedRegistry::new(store, fixture.categories.clone(), fixture.templates.clone());

    assert_eq!(
        registry.initialize(),
        Err(RegistryError::UnresolvableCategory {
            feed_id: "f1".into(),
            category_id: "deleted".into(),
        })
    );
    assert!(registry.is_empty().unwrap());
    assert!(fixture.category("c1").related_feeds().unwrap().is_empty());
}

#[test]
fn stored_category_without_id_resolves_by_name() {
    let fixture = Fixture::new();
    let store = InMemoryFeedStore::with_feeds(vec![stored("f1", "orders", CategoryRef::by_name("catA"))]);
    let registry = FeedRegistry::new(store, fixture.categories.clone(), fixture.templates.clone());

    assert_eq!(registry.initialize().unwrap(), 1);
    let orders = registry.feed_by_id("f1").unwrap().unwrap();
    assert!(orders.category().unwrap().ptr_eq(&fixture.category("c1")));
}
