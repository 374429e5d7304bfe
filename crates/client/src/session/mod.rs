//! Session lifecycle.
//!
//! [`Session`] owns the credential store and exposes the login/logout
//! lifecycle, the decoded identity, and authenticated dispatchers. It is an
//! explicit value constructed at startup and passed by reference to
//! consumers - there is no ambient global session state.

pub mod credentials;
mod error;
pub mod identity;

pub use credentials::{CredentialStore, CredentialStoreError};
pub use error::AuthError;
pub use identity::Identity;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

use crate::api::types::{LoginRequest, LoginResponse};
use crate::api::{ApiClient, InvalidationHook};
use crate::config::ClientConfig;

/// Session controller.
///
/// Handles login, logout, and identity, and hands out [`ApiClient`]s whose
/// 401-invalidation hook is this session's logout: after any request through
/// such a client observes a 401, [`Session::is_authenticated`] is false and
/// [`Session::current_identity`] is absent, with no explicit logout call.
pub struct Session {
    http: reqwest::Client,
    api_url: Url,
    credentials: CredentialStore,
}

impl Session {
    /// Create a session, loading any credential persisted by a prior run.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            credentials: CredentialStore::open(&config.credentials_path),
        }
    }

    // =========================================================================
    // Login / Logout
    // =========================================================================

    /// Log in with username and password.
    ///
    /// Issues an unauthenticated request to the login endpoint; on success
    /// the returned credential is persisted and the session becomes
    /// authenticated.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` on transport failure or any non-2xx
    /// status, `AuthError::MissingToken` if the response carries no usable
    /// token, and `AuthError::Store` if the credential cannot be persisted.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), AuthError> {
        let mut endpoint = self.api_url.clone();
        endpoint.set_path("/auth/login");

        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };

        let response = self
            .http
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Rejected { source: Some(e) })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, "login rejected by backend");
            return Err(AuthError::Rejected { source: None });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Rejected { source: Some(e) })?;
        let response: LoginResponse = serde_json::from_str(&body).map_err(|e| {
            debug!(error = %e, "malformed login response");
            AuthError::MissingToken
        })?;

        let token = response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.credentials.set(SecretString::from(token))?;
        Ok(())
    }

    /// Log out, clearing the persisted credential.
    ///
    /// Idempotent; safe to call when already logged out.
    pub fn logout(&self) {
        self.credentials.clear();
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// The decoded identity of the current credential, if any.
    #[must_use]
    pub fn current_identity(&self) -> Option<Identity> {
        self.credentials.get().as_ref().and_then(identity::decode)
    }

    /// True when a credential is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_present()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// An API client bound to this session.
    ///
    /// The client shares this session's credential store, so it always
    /// dispatches with the latest credential, and its 401 hook clears the
    /// store - the dispatcher-level equivalent of [`Session::logout`].
    #[must_use]
    pub fn api(&self) -> ApiClient {
        let store = self.credentials.clone();
        let on_unauthorized: InvalidationHook = Arc::new(move || store.clear());

        ApiClient::new(
            self.http.clone(),
            self.api_url.clone(),
            self.credentials.clone(),
            on_unauthorized,
        )
    }
}
