//! Configuration for the Snapfolio core

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_IOS_CLIENT_ID: &str =
    "450802810743-tsbm60e76qu5355e63sd5un3f3k60gd5.apps.googleusercontent.com";
const DEFAULT_ANDROID_CLIENT_ID: &str =
    "450802810743-tsbm60e76qu5355e63sd5un3f3k60gd5.apps.googleusercontent.com";
const DEFAULT_WEB_CLIENT_ID: &str =
    "450802810743-gctsqre0bl1f0rvvpr5rlerti80thn7q.apps.googleusercontent.com";
const DEFAULT_MOBILE_REDIRECT_URI: &str = "snapfolio://oauth";
const DEFAULT_WEB_REDIRECT_URI: &str = "http://localhost:19006/oauth";

/// Platform the caller is running on, selecting the OAuth app identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Web,
}

/// Sign-in configuration: per-platform OAuth client identities and the
/// mock-auth toggle
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// OAuth client id used on iOS
    pub ios_client_id: String,

    /// OAuth client id used on Android
    pub android_client_id: String,

    /// OAuth client id used on web
    pub web_client_id: String,

    /// Callback target for the mobile platforms
    pub mobile_redirect_uri: String,

    /// Callback target for web
    pub web_redirect_uri: String,

    /// Bypass the provider entirely and sign in a fixed fake user
    pub use_mock_auth: bool,

    /// Authorization endpoint of the provider
    pub authorization_endpoint: String,

    /// Token endpoint of the provider
    pub token_endpoint: String,

    /// Profile endpoint of the provider
    pub userinfo_endpoint: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            ios_client_id: DEFAULT_IOS_CLIENT_ID.to_string(),
            android_client_id: DEFAULT_ANDROID_CLIENT_ID.to_string(),
            web_client_id: DEFAULT_WEB_CLIENT_ID.to_string(),
            mobile_redirect_uri: DEFAULT_MOBILE_REDIRECT_URI.to_string(),
            web_redirect_uri: DEFAULT_WEB_REDIRECT_URI.to_string(),
            use_mock_auth: false,
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_endpoint: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

impl AuthConfig {
    /// Build the configuration from the environment, falling back to the
    /// built-in defaults for anything unset
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ios_client_id: env::var("GOOGLE_IOS_CLIENT_ID").unwrap_or(defaults.ios_client_id),
            android_client_id: env::var("GOOGLE_ANDROID_CLIENT_ID")
                .unwrap_or(defaults.android_client_id),
            web_client_id: env::var("GOOGLE_WEB_CLIENT_ID").unwrap_or(defaults.web_client_id),
            mobile_redirect_uri: env::var("GOOGLE_MOBILE_REDIRECT_URI")
                .unwrap_or(defaults.mobile_redirect_uri),
            web_redirect_uri: env::var("GOOGLE_WEB_REDIRECT_URI")
                .unwrap_or(defaults.web_redirect_uri),
            use_mock_auth: env::var("USE_MOCK_AUTH")
                .map(|value| value == "true")
                .unwrap_or(defaults.use_mock_auth),
            authorization_endpoint: defaults.authorization_endpoint,
            token_endpoint: defaults.token_endpoint,
            userinfo_endpoint: defaults.userinfo_endpoint,
        }
    }

    /// The client id for `platform`
    pub fn client_id(&self, platform: Platform) -> &str {
        match platform {
            Platform::Ios => &self.ios_client_id,
            Platform::Android => &self.android_client_id,
            Platform::Web => &self.web_client_id,
        }
    }

    /// The redirect URI for `platform`
    pub fn redirect_uri(&self, platform: Platform) -> &str {
        match platform {
            Platform::Web => &self.web_redirect_uri,
            Platform::Ios | Platform::Android => &self.mobile_redirect_uri,
        }
    }

    /// Set whether to bypass the provider with mock sign-in
    pub fn with_use_mock_auth(mut self, value: bool) -> Self {
        self.use_mock_auth = value;
        self
    }

    /// Set the authorization endpoint
    pub fn with_authorization_endpoint(mut self, value: &str) -> Self {
        self.authorization_endpoint = value.to_string();
        self
    }

    /// Set the token endpoint
    pub fn with_token_endpoint(mut self, value: &str) -> Self {
        self.token_endpoint = value.to_string();
        self
    }

    /// Set the profile endpoint
    pub fn with_userinfo_endpoint(mut self, value: &str) -> Self {
        self.userinfo_endpoint = value.to_string();
        self
    }
}

/// Top-level configuration for the composition root
#[derive(Debug, Clone)]
pub struct Config {
    /// Sign-in configuration
    pub auth: AuthConfig,

    /// Directory holding the durable key-value files
    pub data_dir: PathBuf,

    /// Simulated latency of the mock sign-in flow
    pub mock_latency: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snapfolio");
        Self {
            auth: AuthConfig::default(),
            data_dir,
            mock_latency: Duration::from_millis(1500),
        }
    }
}

impl Config {
    /// Build the configuration from the environment
    pub fn from_env() -> Self {
        Self {
            auth: AuthConfig::from_env(),
            ..Self::default()
        }
    }

    /// Set the sign-in configuration
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Set the data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the simulated mock sign-in latency
    pub fn with_mock_latency(mut self, latency: Duration) -> Self {
        self.mock_latency = latency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_follows_platform() {
        let config = AuthConfig::default();
        assert_eq!(config.client_id(Platform::Ios), config.ios_client_id);
        assert_eq!(config.client_id(Platform::Web), config.web_client_id);
    }

    #[test]
    fn mobile_platforms_share_a_redirect_uri() {
        let config = AuthConfig::default();
        assert_eq!(
            config.redirect_uri(Platform::Ios),
            config.redirect_uri(Platform::Android)
        );
        assert_ne!(
            config.redirect_uri(Platform::Ios),
            config.redirect_uri(Platform::Web)
        );
    }

    #[test]
    fn builders_override_endpoints() {
        let config = AuthConfig::default()
            .with_token_endpoint("http://localhost:9/token")
            .with_userinfo_endpoint("http://localhost:9/userinfo")
            .with_use_mock_auth(true);
        assert_eq!(config.token_endpoint, "http://localhost:9/token");
        assert_eq!(config.userinfo_endpoint, "http://localhost:9/userinfo");
        assert!(config.use_mock_auth);
    }
}
