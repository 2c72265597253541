//! Trait seams over the platform camera, picker, and share-sheet
//!
//! These adapters are stateless: there is no state machine beyond
//! permission-then-action sequencing, and provider failures propagate to the
//! caller unchanged. Platform shells implement the traits; the helpers here
//! encode the shared sequencing.

use async_trait::async_trait;

use crate::error::Error;
use crate::storage::GalleryItem;

/// Message surfaced when camera or library access is denied
const PERMISSION_DENIED: &str =
    "Permission denied - please grant camera and photo library access";

/// A picked or captured image reference
#[derive(Debug, Clone, PartialEq)]
pub struct PickedImage {
    /// Local file path or blob URI
    pub uri: String,

    /// Pixel width, when the platform reports it
    pub width: Option<u32>,

    /// Pixel height, when the platform reports it
    pub height: Option<u32>,
}

/// Outcome of a picker or camera request
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// The user selected or captured an image
    Selected(PickedImage),

    /// The user backed out
    Cancelled,
}

/// Camera and media-library access
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Ask for camera and library permission; `false` when denied
    async fn request_permissions(&self) -> Result<bool, Error>;

    /// Pick an image from the library
    async fn pick_image(&self) -> Result<PickOutcome, Error>;

    /// Capture a photo with the camera
    async fn capture_photo(&self) -> Result<PickOutcome, Error>;

    /// Persist a transient uri into the device library, returning the
    /// durable uri
    async fn save_to_library(&self, uri: &str) -> Result<String, Error>;
}

/// Share-sheet access
#[async_trait]
pub trait ShareProvider: Send + Sync {
    /// Share one item, preferring `custom_caption` over the stored caption
    async fn share(&self, item: &GalleryItem, custom_caption: Option<&str>) -> Result<(), Error>;
}

/// Request permission, then pick from the library
pub async fn pick_with_permission(provider: &dyn ImageProvider) -> Result<PickOutcome, Error> {
    if !provider.request_permissions().await? {
        return Err(Error::permission(PERMISSION_DENIED));
    }
    provider.pick_image().await
}

/// Request permission, then capture with the camera
pub async fn capture_with_permission(provider: &dyn ImageProvider) -> Result<PickOutcome, Error> {
    if !provider.request_permissions().await? {
        return Err(Error::permission(PERMISSION_DENIED));
    }
    provider.capture_photo().await
}

/// Share several items sequentially with the same caption
pub async fn share_all(
    provider: &dyn ShareProvider,
    items: &[GalleryItem],
    custom_caption: Option<&str>,
) -> Result<(), Error> {
    if items.is_empty() {
        return Err(Error::general("No images to share"));
    }
    for item in items {
        provider.share(item, custom_caption).await?;
    }
    Ok(())
}
