//! Session-scoped gallery state over the storage service
//!
//! The controller owns an in-memory mirror of the stored collection for the
//! duration of the session. Mutations persist first and touch the cache only
//! once the storage call has succeeded, so the cache never runs ahead of the
//! store; `refresh_items` is the one operation that re-syncs from it.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::Rng;
use tracing::error;

use crate::error::Error;
use crate::storage::{GalleryItem, NewGalleryItem, StorageService};

/// Snapshot of the controller state exposed to the UI layer
#[derive(Debug, Clone, Default)]
pub struct GalleryState {
    /// The mirrored collection, in insertion order
    pub items: Vec<GalleryItem>,

    /// An operation is in flight
    pub is_loading: bool,

    /// Short user-facing message from the last failed operation
    pub error: Option<String>,
}

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Millisecond timestamp plus a random base-36 suffix
fn generate_item_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", Utc::now().timestamp_millis(), suffix)
}

/// Session cache of the gallery collection plus loading and error status
pub struct Gallery {
    storage: Arc<StorageService>,
    state: Mutex<GalleryState>,
}

impl Gallery {
    pub(crate) fn new(storage: Arc<StorageService>) -> Self {
        Self {
            storage,
            state: Mutex::new(GalleryState::default()),
        }
    }

    fn begin(&self) {
        let mut state = self.state.lock().unwrap();
        state.is_loading = true;
        state.error = None;
    }

    fn finish<F>(&self, apply: F)
    where
        F: FnOnce(&mut GalleryState),
    {
        let mut state = self.state.lock().unwrap();
        apply(&mut state);
        state.is_loading = false;
    }

    fn fail(&self, message: &str) {
        let mut state = self.state.lock().unwrap();
        state.is_loading = false;
        state.error = Some(message.to_string());
    }

    /// Snapshot of the current state
    pub fn state(&self) -> GalleryState {
        self.state.lock().unwrap().clone()
    }

    /// The items currently in the session cache
    pub fn items(&self) -> Vec<GalleryItem> {
        self.state.lock().unwrap().items.clone()
    }

    /// Create an item from `data`, persist it, and append it to the cache.
    ///
    /// The id (millisecond timestamp plus random suffix) and both timestamps
    /// are assigned here.
    pub async fn add_item(&self, data: NewGalleryItem) -> Result<GalleryItem, Error> {
        self.begin();

        let now = Utc::now();
        let item = GalleryItem {
            id: generate_item_id(),
            uri: data.uri,
            caption: data.caption,
            created_at: now,
            updated_at: now,
        };

        match self.storage.save_gallery_item(&item).await {
            Ok(()) => {
                let cached = item.clone();
                self.finish(move |state| state.items.push(cached));
                Ok(item)
            }
            Err(err) => {
                error!(%err, "add item failed");
                self.fail("Failed to add gallery item");
                Err(err)
            }
        }
    }

    /// Persist a caption edit and replace the cached entry with the entry as
    /// stored (its `updated_at` refreshed). A silent no-op when no stored
    /// entry matches the id.
    pub async fn update_item(&self, item: GalleryItem) -> Result<Option<GalleryItem>, Error> {
        self.begin();

        match self.storage.update_gallery_item(&item).await {
            Ok(stored) => {
                match stored.clone() {
                    Some(updated) => self.finish(move |state| {
                        if let Some(slot) =
                            state.items.iter_mut().find(|cached| cached.id == updated.id)
                        {
                            *slot = updated;
                        }
                    }),
                    None => self.finish(|_| {}),
                }
                Ok(stored)
            }
            Err(err) => {
                error!(%err, "update item failed");
                self.fail("Failed to update gallery item");
                Err(err)
            }
        }
    }

    /// Persist a deletion and drop the entry from the cache
    pub async fn delete_item(&self, id: &str) -> Result<(), Error> {
        self.begin();

        match self.storage.delete_gallery_item(id).await {
            Ok(()) => {
                let id = id.to_string();
                self.finish(move |state| state.items.retain(|item| item.id != id));
                Ok(())
            }
            Err(err) => {
                error!(%err, "delete item failed");
                self.fail("Failed to delete gallery item");
                Err(err)
            }
        }
    }

    /// Re-read the full collection from the store, replacing the cache
    pub async fn refresh_items(&self) -> Result<Vec<GalleryItem>, Error> {
        self.begin();

        match self.storage.get_gallery_items().await {
            Ok(items) => {
                let cached = items.clone();
                self.finish(move |state| state.items = cached);
                Ok(items)
            }
            Err(err) => {
                error!(%err, "load items failed");
                self.fail("Failed to load gallery items");
                Err(err)
            }
        }
    }

    /// Persist the clear and reset the cache to empty
    pub async fn clear_all_data(&self) -> Result<(), Error> {
        self.begin();

        match self.storage.clear_all_data().await {
            Ok(()) => {
                self.finish(|state| state.items.clear());
                Ok(())
            }
            Err(err) => {
                error!(%err, "clear all data failed");
                self.fail("Failed to clear all data");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ids_are_timestamped_base36() {
        let id = generate_item_id();
        assert!(id.len() > ID_SUFFIX_LEN);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));

        let suffix = &id[id.len() - ID_SUFFIX_LEN..];
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
    }

    #[test]
    fn item_ids_differ_between_calls() {
        assert_ne!(generate_item_id(), generate_item_id());
    }
}
