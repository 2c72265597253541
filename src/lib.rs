//! Snapfolio core library
//!
//! Persistence, gallery state, and sign-in for the Snapfolio photo gallery:
//! a key-value backed storage service holding the gallery collection and the
//! signed-in user, a session-scoped gallery state controller, mock or
//! OAuth-code sign-in, and trait seams for the platform camera, picker, and
//! share-sheet.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gallery;
pub mod kv;
pub mod media;
pub mod storage;

use std::sync::Arc;

use reqwest::Client;

use crate::auth::Auth;
use crate::config::Config;
use crate::gallery::Gallery;
use crate::kv::{FileStore, KeyValueStore};
use crate::storage::StorageService;

/// The composition root wiring the storage, gallery, and auth services
///
/// Services are constructed here and injected with their dependencies, so a
/// test can swap the durable backend for an in-memory one.
pub struct Snapfolio {
    /// Configuration the services were built from
    pub config: Config,

    /// HTTP client used for requests
    pub http_client: Client,

    storage: Arc<StorageService>,
    gallery: Gallery,
    auth: Auth,
}

impl Snapfolio {
    /// Create a client over the durable file store in `config.data_dir`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use snapfolio::{config::Config, Snapfolio};
    ///
    /// let app = Snapfolio::new(Config::from_env());
    /// ```
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data_dir));
        Self::with_store(config, store)
    }

    /// Create a client over any key-value backend
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use snapfolio::{config::Config, kv::MemoryStore, Snapfolio};
    ///
    /// let app = Snapfolio::with_store(Config::default(), Arc::new(MemoryStore::new()));
    /// ```
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let http_client = Client::new();
        let storage = Arc::new(StorageService::new(store));
        let gallery = Gallery::new(storage.clone());
        let auth = Auth::new(
            config.auth.clone(),
            http_client.clone(),
            storage.clone(),
            config.mock_latency,
        );

        Self {
            config,
            http_client,
            storage,
            gallery,
            auth,
        }
    }

    /// The gallery state controller
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// The sign-in service
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// The storage service underneath the controller
    pub fn storage(&self) -> &StorageService {
        &self.storage
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::User;
    pub use crate::config::{Config, Platform};
    pub use crate::error::Error;
    pub use crate::gallery::GalleryState;
    pub use crate::storage::{GalleryItem, NewGalleryItem};
    pub use crate::Snapfolio;
}
