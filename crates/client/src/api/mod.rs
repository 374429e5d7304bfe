//! Authenticated request dispatcher for the cart backend.
//!
//! # Architecture
//!
//! - Thin wrapper over `reqwest` - plain JSON over HTTP, no retries, no
//!   backoff; retry policy belongs to callers
//! - Credentials are read from the shared [`CredentialStore`] at dispatch
//!   time, so every request carries the latest token rather than a snapshot
//!   taken at construction
//! - An HTTP 401 on any request runs the registered invalidation hook
//!   *before* the error is returned, so concurrent callers in the same tick
//!   observe the cleared session
//!
//! # Example
//!
//! ```rust,ignore
//! use greengrocer_client::api::ApiClient;
//!
//! let api = session.api();
//! let response = api.get("/api/cart").await?;
//! let contents: CartContents = ApiClient::json(response).await?;
//! ```

pub mod types;

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use greengrocer_core::Subject;

use crate::session::credentials::CredentialStore;
use crate::session::identity;

/// Header carrying the acting user's subject id.
pub const HEADER_USER_ID: &str = "X-User-Id";

/// Header carrying a fresh id per dispatched request, for log correlation.
pub const HEADER_REQUEST_ID: &str = "X-Request-Id";

/// Hook invoked when the backend rejects the current credential.
pub type InvalidationHook = Arc<dyn Fn() + Send + Sync>;

/// Errors that can occur when dispatching a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, malformed response).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the credential (HTTP 401). The session has
    /// already been invalidated by the time this is observed.
    #[error("authentication rejected")]
    Unauthorized,

    /// Any other non-success status.
    #[error("unexpected status: {0}")]
    Status(StatusCode),

    /// JSON parsing of a response body failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the cart backend API.
///
/// Attaches `Authorization: Bearer` (when a credential is present),
/// `X-User-Id` (subject of the decoded identity, anonymous sentinel
/// otherwise), and a per-request `X-Request-Id` to every outgoing request.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    credentials: CredentialStore,
    on_unauthorized: InvalidationHook,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// `on_unauthorized` runs once per 401 response, before the error is
    /// handed back to the caller.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        credentials: CredentialStore,
        on_unauthorized: InvalidationHook,
    ) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url,
                credentials,
                on_unauthorized,
            }),
        }
    }

    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any non-2xx status.
    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        self.dispatch(self.inner.http.get(self.endpoint(path)))
            .await
    }

    /// Issue a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any non-2xx status.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ApiError> {
        self.dispatch(self.inner.http.post(self.endpoint(path)).json(body))
            .await
    }

    /// Issue a bodyless POST request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any non-2xx status.
    pub async fn post(&self, path: &str) -> Result<Response, ApiError> {
        self.dispatch(self.inner.http.post(self.endpoint(path)))
            .await
    }

    /// Issue a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any non-2xx status.
    pub async fn delete(&self, path: &str) -> Result<Response, ApiError> {
        self.dispatch(self.inner.http.delete(self.endpoint(path)))
            .await
    }

    /// Parse a JSON response body.
    ///
    /// Reads the body as text first so parse failures can be logged with
    /// their offending payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be read or parsed.
    pub async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text().await?;

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.inner.base_url.clone();
        url.set_path(path);
        url
    }

    /// Attach headers and send, triaging the response status.
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.attach_headers(request).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // Invalidate before the caller sees the error, so anything else
            // dispatched in the same tick observes the cleared session.
            warn!("backend rejected credential, invalidating session");
            (self.inner.on_unauthorized)();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            debug!(status = %status, "backend returned non-success status");
            return Err(ApiError::Status(status));
        }

        Ok(response)
    }

    fn attach_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request.header(HEADER_REQUEST_ID, Uuid::new_v4().to_string());

        // Read the store at dispatch time: the credential may have changed
        // since this client was constructed.
        let credential = self.inner.credentials.get();
        let subject = credential
            .as_ref()
            .and_then(identity::decode)
            .map_or_else(Subject::anonymous, |identity| identity.subject);

        if let Some(credential) = &credential {
            request = request.bearer_auth(credential.expose_secret());
        }

        request.header(HEADER_USER_ID, subject.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Unauthorized;
        assert_eq!(err.to_string(), "authentication rejected");

        let err = ApiError::Status(StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "unexpected status: 502 Bad Gateway");
    }
}
