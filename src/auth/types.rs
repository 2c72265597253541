//! Types for authentication and user management

use serde::{Deserialize, Serialize};

/// The signed-in user.
///
/// At most one user record is persisted at a time; signing out deletes it
/// entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Provider-assigned identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// Token endpoint response for the authorization-code exchange
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The access token used against the profile endpoint
    pub access_token: String,

    /// The expiry time in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,

    /// The token type
    #[serde(default)]
    pub token_type: Option<String>,

    /// OpenID Connect id token, unused here
    #[serde(default)]
    pub id_token: Option<String>,

    /// Granted scopes
    #[serde(default)]
    pub scope: Option<String>,
}

/// Profile payload from the userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub picture: Option<String>,
}

/// Outcome of the browser authorization step, as reported by the platform
/// shell that drove it
#[derive(Debug, Clone)]
pub enum AuthCallback {
    /// The provider redirected back with an authorization code
    Code(String),

    /// The provider redirected back with an error
    Error {
        code: String,
        description: String,
    },

    /// The user dismissed the prompt
    Cancelled,
}
