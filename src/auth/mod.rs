//! Sign-in flows and the persisted user session
//!
//! Two interchangeable flows sit behind one service, selected by the
//! `use_mock_auth` configuration flag: a mock flow that signs in a fixed fake
//! user for development, and an authorization-code-with-PKCE flow against the
//! configured provider. Both persist the resulting [`User`] as the single
//! user record and cache it in memory for the session.
//!
//! Conceptually the session moves SignedOut → Authenticating → SignedIn, and
//! back to SignedOut only through [`Auth::sign_out`]. There is no token
//! refresh: a signed-in session stays valid until it is signed out or the
//! persisted record is cleared externally.

mod pkce;
mod types;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::config::{AuthConfig, Platform};
use crate::error::{AuthError, Error};
use crate::fetch::Fetch;
use crate::storage::StorageService;

pub use pkce::PkceVerifier;
pub use types::*;

/// Fixed candidate users for the mock flow
fn mock_candidates() -> Vec<User> {
    vec![
        User {
            id: "mock-user-123".to_string(),
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            picture: Some(
                "https://ui-avatars.com/api/?name=John+Doe&background=6366f1&color=fff&size=150"
                    .to_string(),
            ),
        },
        User {
            id: "mock-user-456".to_string(),
            name: "Jane Smith".to_string(),
            email: "jane.smith@example.com".to_string(),
            picture: Some(
                "https://ui-avatars.com/api/?name=Jane+Smith&background=10b981&color=fff&size=150"
                    .to_string(),
            ),
        },
        User {
            id: "mock-user-789".to_string(),
            name: "Alex Johnson".to_string(),
            email: "alex.johnson@example.com".to_string(),
            picture: Some(
                "https://ui-avatars.com/api/?name=Alex+Johnson&background=f59e0b&color=fff&size=150"
                    .to_string(),
            ),
        },
    ]
}

/// Sign-in service over the persisted user record
pub struct Auth {
    /// Sign-in configuration
    config: AuthConfig,

    /// HTTP client used for requests
    client: Client,

    /// Owner of the persisted user record
    storage: Arc<StorageService>,

    /// In-memory cache of the signed-in user
    user: Mutex<Option<User>>,

    /// Simulated latency of the mock flow
    mock_latency: Duration,
}

impl Auth {
    /// Create a new Auth service
    pub(crate) fn new(
        config: AuthConfig,
        client: Client,
        storage: Arc<StorageService>,
        mock_latency: Duration,
    ) -> Self {
        Self {
            config,
            client,
            storage,
            user: Mutex::new(None),
            mock_latency,
        }
    }

    /// Sign in through the configured flow.
    ///
    /// With `use_mock_auth` set this is the mock flow; otherwise callers must
    /// drive the browser flow via [`authorize_url`](Self::authorize_url) and
    /// [`complete_sign_in`](Self::complete_sign_in), and this returns a
    /// configuration error pointing there.
    pub async fn sign_in(&self) -> Result<User, Error> {
        if !self.config.use_mock_auth {
            return Err(AuthError::Configuration(
                "interactive sign-in requires the authorization-code flow".to_string(),
            )
            .into());
        }
        self.sign_in_mock().await
    }

    /// Mock sign-in: a pseudo-random pick from the fixed candidate list,
    /// persisted after a simulated delay
    pub async fn sign_in_mock(&self) -> Result<User, Error> {
        debug!("using mock authentication");
        tokio::time::sleep(self.mock_latency).await;

        let mut candidates = mock_candidates();
        let pick = rand::thread_rng().gen_range(0..candidates.len());
        let user = candidates.swap_remove(pick);

        self.persist_user(&user).await?;
        debug!(id = %user.id, "mock user signed in");
        Ok(user)
    }

    /// Build the authorization URL for `platform`, along with the PKCE
    /// verifier to hand back when the resulting code is exchanged
    pub fn authorize_url(&self, platform: Platform) -> Result<(Url, PkceVerifier), Error> {
        let verifier = PkceVerifier::generate();
        let mut url = Url::parse(&self.config.authorization_endpoint)?;
        url.query_pairs_mut()
            .append_pair("client_id", self.config.client_id(platform))
            .append_pair("redirect_uri", self.config.redirect_uri(platform))
            .append_pair("response_type", "code")
            .append_pair("scope", "openid profile email")
            .append_pair("code_challenge", &verifier.challenge())
            .append_pair("code_challenge_method", "S256")
            .append_pair("prompt", "select_account");
        Ok((url, verifier))
    }

    /// Complete sign-in from the browser callback outcome
    pub async fn complete_sign_in(
        &self,
        callback: AuthCallback,
        verifier: &PkceVerifier,
        platform: Platform,
    ) -> Result<User, Error> {
        match callback {
            AuthCallback::Code(code) => self.exchange_code(&code, verifier, platform).await,
            AuthCallback::Error { code, description } => {
                warn!(%code, %description, "authorization request failed");
                Err(AuthError::Other(format!("{}: {}", code, description)).into())
            }
            AuthCallback::Cancelled => Err(AuthError::Cancelled.into()),
        }
    }

    /// Exchange an authorization code for tokens, fetch the profile, and
    /// persist the signed-in user
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &PkceVerifier,
        platform: Platform,
    ) -> Result<User, Error> {
        let response = Fetch::post(&self.client, &self.config.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id(platform)),
                ("redirect_uri", self.config.redirect_uri(platform)),
                ("code_verifier", verifier.as_str()),
            ])
            .execute_raw()
            .await
            .map_err(as_network_failure)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "token exchange failed");
            let failure = if status == StatusCode::BAD_REQUEST {
                // Bad client id, redirect URI mismatch, or malformed request
                AuthError::Configuration(body)
            } else {
                AuthError::Other(format!("token exchange failed with status {}", status))
            };
            return Err(failure.into());
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))?;
        debug!("token exchange successful");

        let user = self.fetch_profile(&token.access_token).await?;
        self.persist_user(&user).await?;
        debug!(id = %user.id, "user signed in");
        Ok(user)
    }

    /// Fetch the profile behind `access_token` and map it to a [`User`]
    async fn fetch_profile(&self, access_token: &str) -> Result<User, Error> {
        let mut params = HashMap::new();
        params.insert("access_token".to_string(), access_token.to_string());

        let info: UserInfo = Fetch::get(&self.client, &self.config.userinfo_endpoint)
            .query(params)
            .bearer_auth(access_token)
            .execute()
            .await
            .map_err(as_network_failure)?;

        let (Some(id), Some(email)) = (info.id, info.email) else {
            return Err(AuthError::Other("incomplete profile received from provider".to_string()).into());
        };

        let name = info
            .name
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let picture = match info.picture {
            Some(picture) => Some(picture),
            None => generated_avatar_url(&name).ok(),
        };

        Ok(User {
            id,
            name,
            email,
            picture,
        })
    }

    async fn persist_user(&self, user: &User) -> Result<(), Error> {
        self.storage.set_user(user).await?;
        let mut cached = self.user.lock().unwrap();
        *cached = Some(user.clone());
        Ok(())
    }

    /// The currently signed-in user: the in-memory cache first, then the
    /// persisted record (cached once read). `None` when signed out.
    pub async fn current_user(&self) -> Result<Option<User>, Error> {
        if let Some(user) = self.user.lock().unwrap().clone() {
            return Ok(Some(user));
        }

        let stored = self.storage.get_user().await?;
        if let Some(ref user) = stored {
            let mut cached = self.user.lock().unwrap();
            *cached = Some(user.clone());
        }
        Ok(stored)
    }

    /// Whether a user is currently signed in
    pub async fn is_authenticated(&self) -> Result<bool, Error> {
        Ok(self.current_user().await?.is_some())
    }

    /// Sign out: drop the cached user and delete the persisted record
    pub async fn sign_out(&self) -> Result<(), Error> {
        {
            let mut cached = self.user.lock().unwrap();
            *cached = None;
        }
        self.storage.clear_user().await?;
        debug!("user signed out");
        Ok(())
    }
}

/// Fallback avatar for profiles without a picture
fn generated_avatar_url(name: &str) -> Result<String, Error> {
    let mut url = Url::parse("https://ui-avatars.com/api/")?;
    url.query_pairs_mut()
        .append_pair("name", name)
        .append_pair("background", "random");
    Ok(url.to_string())
}

/// Transport-level failures map to the network category
fn as_network_failure(err: Error) -> Error {
    match err {
        Error::Http(inner) => AuthError::Network(inner.to_string()).into(),
        other => other,
    }
}
