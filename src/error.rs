//! Error handling for the Snapfolio core

use std::fmt;
use thiserror::Error;

/// Failure categories for the sign-in flows.
///
/// Every sign-in failure is mapped to one of these before it reaches the UI
/// layer, which renders a short message per category.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The user dismissed the authorization prompt
    #[error("Authentication was cancelled")]
    Cancelled,

    /// The provider could not be reached
    #[error("Network error during authentication: {0}")]
    Network(String),

    /// Client id / redirect URI rejected by the provider
    #[error("Authentication configuration error: {0}")]
    Configuration(String),

    /// Anything else
    #[error("Authentication failed: {0}")]
    Other(String),
}

/// Unified error type for the Snapfolio core
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors from the durable key-value backend
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Persistence errors from the key-value store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Camera or media-library access denied
    #[error("Permission error: {0}")]
    Permission(String),

    /// Authentication errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new permission error
    pub fn permission<T: fmt::Display>(msg: T) -> Self {
        Error::Permission(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }
}
