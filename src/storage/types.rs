//! Types for the gallery storage service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored photo reference with caption and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    /// Unique, immutable identifier assigned at creation
    pub id: String,

    /// Reference to the image content (local file path or blob URI)
    pub uri: String,

    /// User-editable caption, may be empty
    pub caption: String,

    /// Set once at creation
    pub created_at: DateTime<Utc>,

    /// Refreshed on every update
    pub updated_at: DateTime<Utc>,
}

/// Input for a new gallery item; the id and timestamps are assigned by the
/// gallery when it is added
#[derive(Debug, Clone, Default)]
pub struct NewGalleryItem {
    /// Reference to the image content
    pub uri: String,

    /// Initial caption
    pub caption: String,
}
