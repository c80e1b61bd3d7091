use std::collections::BTreeSet;

use crawldash_core::{CrawlRecord, CrawlStatus, RecordStore, TransitionError};
use pretty_assertions::assert_eq;

fn store_with(ids: &[u64]) -> RecordStore {
    let mut store = RecordStore::new();
    store.replace_all(
        ids.iter()
            .map(|&id| CrawlRecord::queued(id, format!("https://{id}.example"), 0))
            .collect(),
    );
    store
}

fn ids(store: &RecordStore) -> Vec<u64> {
    store.snapshot().iter().map(|r| r.id).collect()
}

#[test]
fn upsert_overwrites_in_place_or_appends() {
    let mut store = store_with(&[1, 2]);

    let mut updated = CrawlRecord::queued(1, "https://one.example", 0);
    updated.title = "One".to_string();
    store.upsert(updated);
    store.upsert(CrawlRecord::queued(3, "https://3.example", 0));

    assert_eq!(ids(&store), vec![1, 2, 3]);
    assert_eq!(store.get(1).unwrap().title, "One");
}

#[test]
fn remove_is_idempotent_and_ignores_unknown_ids() {
    let mut store = store_with(&[1, 2, 3]);
    let targets = BTreeSet::from([2, 99]);

    assert_eq!(store.remove(&targets), 1);
    let once = store.clone();
    assert_eq!(store.remove(&targets), 0);
    assert_eq!(store, once);
    assert_eq!(ids(&store), vec![1, 3]);
}

#[test]
fn replace_all_keeps_ids_unique() {
    let mut store = store_with(&[9]);
    let mut dup = CrawlRecord::queued(1, "https://later.example", 0);
    dup.status = CrawlStatus::Completed;
    store.replace_all(vec![
        CrawlRecord::queued(1, "https://first.example", 0),
        CrawlRecord::queued(2, "https://2.example", 0),
        dup,
    ]);

    assert_eq!(ids(&store), vec![1, 2]);
    assert_eq!(store.get(1).unwrap().url, "https://later.example");
    assert!(!store.contains(9));
}

#[test]
fn transitions_are_checked_against_the_lifecycle() {
    let mut store = store_with(&[1]);

    assert_eq!(store.transition(1, CrawlStatus::Running), Ok(CrawlStatus::Queued));
    assert_eq!(store.transition(1, CrawlStatus::Completed), Ok(CrawlStatus::Running));
    assert_eq!(
        store.transition(1, CrawlStatus::Running),
        Err(TransitionError::Invalid {
            id: 1,
            from: CrawlStatus::Completed,
            to: CrawlStatus::Running,
        })
    );
    assert_eq!(store.transition(1, CrawlStatus::Queued), Ok(CrawlStatus::Completed));
    assert_eq!(
        store.transition(7, CrawlStatus::Queued),
        Err(TransitionError::UnknownRecord(7))
    );
}

#[test]
fn status_counts_cover_the_whole_store() {
    let mut store = store_with(&[1, 2, 3]);
    store.transition(2, CrawlStatus::Running).unwrap();
    let counts = store.status_counts();
    assert_eq!(counts.get(CrawlStatus::Queued), 2);
    assert_eq!(counts.get(CrawlStatus::Running), 1);
    assert_eq!(counts.total(), 3);
}

#[test]
fn lookup_by_url_is_exact() {
    let store = store_with(&[1, 2]);
    assert_eq!(store.find_by_url("https://2.example").map(|r| r.id), Some(2));
    assert!(store.find_by_url("https://2.example/").is_none());
}
