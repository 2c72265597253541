use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use snapfolio::config::Config;
use snapfolio::error::Error;
use snapfolio::kv::{KeyValueStore, MemoryStore};
use snapfolio::storage::NewGalleryItem;
use snapfolio::Snapfolio;

fn test_config() -> Config {
    Config::default().with_mock_latency(Duration::ZERO)
}

fn test_client() -> (Snapfolio, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Snapfolio::with_store(test_config(), store.clone()), store)
}

fn new_item(uri: &str, caption: &str) -> NewGalleryItem {
    NewGalleryItem {
        uri: uri.to_string(),
        caption: caption.to_string(),
    }
}

/// A backend whose writes always fail, for exercising the error path
struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), Error> {
        Err(Error::storage("disk full"))
    }

    async fn remove(&self, _key: &str) -> Result<(), Error> {
        Err(Error::storage("disk full"))
    }
}

#[tokio::test]
async fn adds_grow_the_cache_with_unique_ids() {
    let (app, _) = test_client();
    let gallery = app.gallery();

    for index in 0..5 {
        gallery
            .add_item(new_item(
                &format!("file:///photos/{}.jpg", index),
                &format!("photo {}", index),
            ))
            .await
            .unwrap();
    }

    let state = gallery.state();
    assert_eq!(state.items.len(), 5);
    assert!(!state.is_loading);
    assert!(state.error.is_none());

    let ids: HashSet<String> = state.items.iter().map(|item| item.id.clone()).collect();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn update_changes_one_entry_and_bumps_updated_at() {
    let (app, _) = test_client();
    let gallery = app.gallery();

    let first = gallery.add_item(new_item("a.jpg", "sunset")).await.unwrap();
    let second = gallery.add_item(new_item("b.jpg", "harbor")).await.unwrap();

    let mut edited = first.clone();
    edited.caption = "sunset over hills".to_string();
    let stored = gallery.update_item(edited).await.unwrap().unwrap();

    assert_eq!(stored.id, first.id);
    assert_eq!(stored.caption, "sunset over hills");
    assert!(stored.updated_at >= first.updated_at);

    let items = gallery.items();
    assert_eq!(items.len(), 2);
    let updated = items.iter().find(|item| item.id == first.id).unwrap();
    assert_eq!(updated, &stored);
    let untouched = items.iter().find(|item| item.id == second.id).unwrap();
    assert_eq!(untouched, &second);
}

#[tokio::test]
async fn delete_removes_exactly_the_matching_entry() {
    let (app, _) = test_client();
    let gallery = app.gallery();

    let first = gallery.add_item(new_item("a.jpg", "one")).await.unwrap();
    let second = gallery.add_item(new_item("b.jpg", "two")).await.unwrap();

    gallery.delete_item(&first.id).await.unwrap();

    let items = gallery.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0], second);

    let stored = app.storage().get_gallery_items().await.unwrap();
    assert_eq!(stored, items);
}

#[tokio::test]
async fn clear_empties_store_and_cache() {
    let (app, _) = test_client();
    let gallery = app.gallery();

    gallery.add_item(new_item("a.jpg", "one")).await.unwrap();
    gallery.clear_all_data().await.unwrap();

    assert!(gallery.items().is_empty());
    assert!(app.storage().get_gallery_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn persisted_items_round_trip_through_a_fresh_session() {
    let (app, store) = test_client();
    let added = app
        .gallery()
        .add_item(new_item("file:///photos/pier.jpg", "pier at dawn"))
        .await
        .unwrap();

    // A second client over the same backend sees the identical record
    let reopened = Snapfolio::with_store(test_config(), store);
    let items = reopened.gallery().refresh_items().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0], added);
    assert_eq!(reopened.gallery().items(), items);
}

#[tokio::test]
async fn add_update_delete_scenario() {
    let (app, _) = test_client();
    let gallery = app.gallery();

    let item = gallery.add_item(new_item("a.jpg", "sunset")).await.unwrap();
    assert_eq!(gallery.items().len(), 1);
    assert_eq!(gallery.items()[0].caption, "sunset");

    let mut edited = item.clone();
    edited.caption = "sunset over hills".to_string();
    gallery.update_item(edited).await.unwrap();

    let cached = gallery.items();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].caption, "sunset over hills");
    assert!(cached[0].updated_at >= item.updated_at);

    gallery.delete_item(&item.id).await.unwrap();
    assert!(gallery.items().is_empty());
    assert!(app.storage().get_gallery_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_blob_reads_as_empty() {
    let (app, store) = test_client();

    store.set("gallery_items", "definitely not json").await.unwrap();

    assert!(app.storage().get_gallery_items().await.unwrap().is_empty());
    assert!(app.gallery().refresh_items().await.unwrap().is_empty());

    // The strict path still reports what the lenient read recovered from
    assert!(app.storage().check_integrity().await.is_err());
}

#[tokio::test]
async fn concurrent_adds_both_survive() {
    let (app, _) = test_client();
    let gallery = app.gallery();

    let (left, right) = tokio::join!(
        gallery.add_item(new_item("left.jpg", "left")),
        gallery.add_item(new_item("right.jpg", "right")),
    );
    left.unwrap();
    right.unwrap();

    let stored = app.storage().get_gallery_items().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(gallery.items().len(), 2);
}

#[tokio::test]
async fn failed_persist_leaves_cache_unchanged() {
    let app = Snapfolio::with_store(test_config(), Arc::new(FailingStore));
    let gallery = app.gallery();

    let result = gallery.add_item(new_item("a.jpg", "doomed")).await;
    assert!(result.is_err());

    let state = gallery.state();
    assert!(state.items.is_empty());
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some("Failed to add gallery item"));
}

#[tokio::test]
async fn file_store_survives_process_style_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config().with_data_dir(dir.path());

    let app = Snapfolio::new(config.clone());
    let added = app
        .gallery()
        .add_item(new_item("file:///photos/keep.jpg", "keep me"))
        .await
        .unwrap();
    drop(app);

    let reopened = Snapfolio::new(config);
    let items = reopened.gallery().refresh_items().await.unwrap();
    assert_eq!(items, vec![added]);
}
