//! Cart state synchronization.
//!
//! [`CartSync`] keeps a local copy of the server-authoritative cart and its
//! bill. Every mutation is one compound operation - mutate, reload the cart,
//! recompute the bill - so the snapshot and bill on display always belong
//! together. Nothing is mutated optimistically and nothing is cached: a
//! failed step leaves the previously committed snapshot/bill pair untouched.
//!
//! Operations take `&mut self`, so overlapping operations on one
//! synchronizer are unrepresentable; [`SyncState::Syncing`] exists for view
//! layers that disable controls while an operation is outstanding.

use thiserror::Error;
use tracing::instrument;

use greengrocer_core::{CatalogItem, QuantityMap};

use crate::api::types::{AddItemRequest, Bill, CartContents};
use crate::api::{ApiClient, ApiError};

/// Generic retry-prompting message for a failed reload or bill recompute.
const MSG_REFRESH: &str = "Something went wrong. Please try again.";
const MSG_ADD: &str = "Failed to add item";
const MSG_REMOVE: &str = "Failed to remove item";
const MSG_CLEAR: &str = "Failed to clear cart";

/// Synchronizer state, observed by the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No operation outstanding; the snapshot/bill pair is current.
    #[default]
    Idle,
    /// An operation is in flight; the view must not start another.
    Syncing,
    /// The last operation failed; carries the user-facing message. The
    /// snapshot/bill pair is the last successfully committed one.
    Error(String),
}

/// Errors surfaced by synchronizer operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The backend rejected the credential mid-operation. The session has
    /// already been invalidated; the user must log in again.
    #[error("session expired")]
    SessionExpired,

    /// Any other request failure; terminal for this call, no retry.
    #[error("cart request failed: {0}")]
    Request(ApiError),
}

impl From<ApiError> for SyncError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => Self::SessionExpired,
            other => Self::Request(other),
        }
    }
}

/// A failed step plus the message the view should show for it.
struct OpFailure {
    message: &'static str,
    error: SyncError,
}

type OpResult = Result<(), OpFailure>;

/// Cart synchronizer.
///
/// # Example
///
/// ```rust,ignore
/// let mut cart = CartSync::new(session.api());
/// cart.refresh().await?;
/// cart.add_item(CatalogItem::Apple).await?;
/// assert_eq!(cart.quantities().get(CatalogItem::Apple), 1);
/// ```
pub struct CartSync {
    api: ApiClient,
    state: SyncState,
    items: Vec<String>,
    bill: Option<Bill>,
}

impl CartSync {
    /// Create a synchronizer with an empty snapshot and no bill.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: SyncState::Idle,
            items: Vec::new(),
            bill: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SyncState {
        &self.state
    }

    /// The last committed cart snapshot, in server order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The bill matching [`CartSync::items`]; `None` while the cart is
    /// empty (the bill is not recomputed for an empty cart).
    #[must_use]
    pub const fn bill(&self) -> Option<&Bill> {
        self.bill.as_ref()
    }

    /// Per-item quantities, recomputed from the current snapshot on every
    /// call so they can never diverge from it.
    #[must_use]
    pub fn quantities(&self) -> QuantityMap {
        QuantityMap::from_snapshot(&self.items)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Reload the cart and recompute the bill.
    ///
    /// # Errors
    ///
    /// Returns an error if either step fails; the previously committed
    /// snapshot/bill pair is left untouched.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        self.state = SyncState::Syncing;
        let result = self.reload().await;
        self.settle(result)
    }

    /// Add one unit of `item`, then reload and recompute.
    ///
    /// # Errors
    ///
    /// Returns an error if the addition or the subsequent reload fails. A
    /// failed addition does not attempt the reload.
    #[instrument(skip(self), fields(item = %item))]
    pub async fn add_item(&mut self, item: CatalogItem) -> Result<(), SyncError> {
        self.state = SyncState::Syncing;
        let result = self.add_then_reload(item).await;
        self.settle(result)
    }

    /// Remove one unit of `item`, then reload and recompute.
    ///
    /// The server treats removing from zero as a no-op; the client does not
    /// pre-validate beyond the view disabling the control at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal or the subsequent reload fails.
    #[instrument(skip(self), fields(item = %item))]
    pub async fn remove_one(&mut self, item: CatalogItem) -> Result<(), SyncError> {
        self.state = SyncState::Syncing;
        let result = self.remove_then_reload(item).await;
        self.settle(result)
    }

    /// Remove everything from the cart, then reload and recompute.
    ///
    /// Legal on an already-empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the clear or the subsequent reload fails.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), SyncError> {
        self.state = SyncState::Syncing;
        let result = self.clear_then_reload().await;
        self.settle(result)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn settle(&mut self, result: OpResult) -> Result<(), SyncError> {
        match result {
            Ok(()) => {
                self.state = SyncState::Idle;
                Ok(())
            }
            Err(failure) => {
                self.state = SyncState::Error(failure.message.to_owned());
                Err(failure.error)
            }
        }
    }

    async fn add_then_reload(&mut self, item: CatalogItem) -> OpResult {
        self.api
            .post_json("/api/cart/items", &AddItemRequest { item: item.name() })
            .await
            .map_err(|e| OpFailure {
                message: MSG_ADD,
                error: e.into(),
            })?;

        self.reload().await
    }

    async fn remove_then_reload(&mut self, item: CatalogItem) -> OpResult {
        let path = format!("/api/cart/items/{}", urlencoding::encode(item.name()));
        self.api.delete(&path).await.map_err(|e| OpFailure {
            message: MSG_REMOVE,
            error: e.into(),
        })?;

        self.reload().await
    }

    async fn clear_then_reload(&mut self) -> OpResult {
        self.api.delete("/api/cart").await.map_err(|e| OpFailure {
            message: MSG_CLEAR,
            error: e.into(),
        })?;

        self.reload().await
    }

    /// Reload the snapshot, recompute the bill, and commit both together.
    ///
    /// The new values are staged in locals and only assigned once both
    /// requests have succeeded, so a failure in either step cannot leave a
    /// snapshot paired with a stale bill.
    async fn reload(&mut self) -> OpResult {
        let staged = self.fetch_cart_and_bill().await.map_err(|e| OpFailure {
            message: MSG_REFRESH,
            error: e,
        })?;

        (self.items, self.bill) = staged;
        Ok(())
    }

    async fn fetch_cart_and_bill(&self) -> Result<(Vec<String>, Option<Bill>), SyncError> {
        let response = self.api.get("/api/cart").await?;
        let contents: CartContents = ApiClient::json(response).await?;
        let items = contents.cart;

        // An empty cart has no bill; skip the compute call entirely.
        let bill = if items.is_empty() {
            None
        } else {
            let response = self.api.post("/api/cart/total").await?;
            Some(ApiClient::json(response).await?)
        };

        Ok((items, bill))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_session_expired() {
        let err = SyncError::from(ApiError::Unauthorized);
        assert!(matches!(err, SyncError::SessionExpired));
        assert_eq!(err.to_string(), "session expired");
    }

    #[test]
    fn test_other_api_errors_pass_through() {
        let err = SyncError::from(ApiError::Status(reqwest::StatusCode::BAD_GATEWAY));
        assert!(matches!(err, SyncError::Request(_)));
    }

    #[test]
    fn test_initial_state_is_idle_and_empty() {
        assert_eq!(SyncState::default(), SyncState::Idle);
    }
}
