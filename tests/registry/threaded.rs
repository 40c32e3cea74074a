//! Concurrent writers sharing one registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use feed_registry::FeedStore;

use crate::support::{feed_in, Fixture};

const WRITERS: usize = 8;

#[test]
fn concurrent_saves_are_serialized_with_their_snapshots() {
    let fixture = Fixture::new();
    let registry = Arc::new(fixture.registry());

    let handles: Vec<_> = (0..WRITERS)
        .map(|n| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let category = if n % 2 == 0 { "c1" } else { "c2" };
                let created = registry
                    .save(feed_in(&format!("feed-{}", n), category, "t1"))
                    .unwrap();
                registry.save(created).unwrap()
            })
        })
        .collect();

    let saved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(saved.iter().all(|feed| feed.version == 2));
    assert_eq!(registry.len().unwrap(), WRITERS);
    assert_eq!(fixture.store.write_count(), (WRITERS * 2) as u64);

    let in_memory: HashMap<String, u64> = registry
        .feeds()
        .unwrap()
        .into_iter()
        .map(|feed| (feed.id.unwrap(), feed.version))
        .collect();
    let snapshot: HashMap<String, u64> = fixture
        .store
        .load_feeds()
        .unwrap()
        .into_iter()
        .map(|feed| (feed.id.unwrap(), feed.version))
        .collect();
    assert_eq!(in_memory, snapshot);

    let linked = registry.summaries_for_category("c1").unwrap().len()
        + registry.summaries_for_category("c2").unwrap().len();
    assert_eq!(linked, WRITERS);
}

#[test]
fn concurrent_retags_write_once() {
    let fixture = Fixture::new();
    let registry = Arc::new(fixture.registry());
    for n in 0..WRITERS {
        registry.save(feed_in(&format!("feed-{}", n), "c1", "old")).unwrap();
    }
    let writes_before = fixture.store.write_count();

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.retag_template("old", "new").unwrap())
        })
        .collect();

    let retagged: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(retagged, WRITERS);
    assert_eq!(fixture.store.write_count(), writes_before + 1);
    assert!(fixture
        .store
        .load_feeds()
        .unwrap()
        .iter()
        .all(|feed| feed.template_id == "new"));
}
