//! Durable CRUD over the gallery collection and the signed-in user record
//!
//! The whole collection lives as one serialized value under a fixed key, so
//! every mutation is a full read-modify-write cycle. Mutations are funneled
//! through a single writer to keep concurrent cycles from dropping each
//! other's writes; reads take no lock.

mod types;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::User;
use crate::error::Error;
use crate::kv::KeyValueStore;

pub use types::*;

/// Storage key holding the serialized gallery collection
const GALLERY_KEY: &str = "gallery_items";

/// Storage key holding the signed-in user record
const USER_KEY: &str = "user";

/// Durable CRUD over the gallery collection, stored as one serialized value
/// under a fixed key in the key-value backend
pub struct StorageService {
    /// The key-value backend
    store: Arc<dyn KeyValueStore>,

    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl StorageService {
    /// Create a service over `store`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_items(&self) -> Result<Vec<GalleryItem>, Error> {
        match self.store.get(GALLERY_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(items) => Ok(items),
                Err(err) => {
                    // Malformed data reads as empty; check_integrity exposes it
                    warn!(key = GALLERY_KEY, %err, "discarding malformed gallery data");
                    Ok(Vec::new())
                }
            },
        }
    }

    async fn write_items(&self, items: &[GalleryItem]) -> Result<(), Error> {
        let raw = serde_json::to_string(items)?;
        self.store.set(GALLERY_KEY, &raw).await
    }

    /// Read the full gallery collection.
    ///
    /// An absent key reads as an empty collection. So does a malformed one,
    /// after a warning; callers that must distinguish recovery from absence
    /// use [`check_integrity`](Self::check_integrity).
    pub async fn get_gallery_items(&self) -> Result<Vec<GalleryItem>, Error> {
        self.read_items().await
    }

    /// Strictly parse the stored collection, surfacing corruption that the
    /// lenient read path recovers from. Returns the item count.
    pub async fn check_integrity(&self) -> Result<usize, Error> {
        match self.store.get(GALLERY_KEY).await? {
            None => Ok(0),
            Some(raw) => {
                let items: Vec<GalleryItem> = serde_json::from_str(&raw).map_err(|err| {
                    Error::storage(format!("corrupt data under {}: {}", GALLERY_KEY, err))
                })?;
                Ok(items.len())
            }
        }
    }

    /// Append `item` to the stored collection
    pub async fn save_gallery_item(&self, item: &GalleryItem) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_items().await?;
        items.push(item.clone());
        self.write_items(&items).await?;
        debug!(id = %item.id, "gallery item saved");
        Ok(())
    }

    /// Replace the stored entry whose id matches `item`, refreshing its
    /// `updated_at`. Returns the entry as stored, or `None` when no entry
    /// matched (a silent no-op).
    pub async fn update_gallery_item(
        &self,
        item: &GalleryItem,
    ) -> Result<Option<GalleryItem>, Error> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_items().await?;

        let mut stored = None;
        if let Some(existing) = items.iter_mut().find(|existing| existing.id == item.id) {
            let mut updated = item.clone();
            updated.updated_at = Utc::now();
            *existing = updated.clone();
            stored = Some(updated);
        }

        if stored.is_some() {
            self.write_items(&items).await?;
            debug!(id = %item.id, "gallery item updated");
        }
        Ok(stored)
    }

    /// Remove the entry with `id` from the stored collection
    pub async fn delete_gallery_item(&self, id: &str) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_items().await?;
        items.retain(|item| item.id != id);
        self.write_items(&items).await?;
        debug!(%id, "gallery item deleted");
        Ok(())
    }

    /// Remove the gallery key entirely
    pub async fn clear_all_data(&self) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(GALLERY_KEY).await?;
        debug!("gallery data cleared");
        Ok(())
    }

    /// Read the persisted user record, `None` when signed out.
    ///
    /// A malformed record reads as signed out, after a warning.
    pub async fn get_user(&self) -> Result<Option<User>, Error> {
        match self.store.get(USER_KEY).await? {
            None => Ok(None),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(user) => Ok(Some(user)),
                Err(err) => {
                    warn!(key = USER_KEY, %err, "discarding malformed user record");
                    Ok(None)
                }
            },
        }
    }

    /// Persist `user` as the single signed-in user record
    pub async fn set_user(&self, user: &User) -> Result<(), Error> {
        let raw = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &raw).await
    }

    /// Delete the persisted user record
    pub async fn clear_user(&self) -> Result<(), Error> {
        self.store.remove(USER_KEY).await
    }
}
