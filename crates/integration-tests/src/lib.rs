//! Integration tests for Greengrocer.
//!
//! This crate provides [`TestBackend`], an in-process fake of the cart
//! backend the client talks to. It speaks the same HTTP contract (login,
//! cart CRUD, bill computation with offers) over a real socket, so tests
//! exercise the client library end to end: credential persistence, header
//! attachment, 401 invalidation, and the mutate-reload-recompute protocol.
//!
//! # Behavior fidelity
//!
//! - Bearer tokens are unsigned JWTs minted at login and tracked in a
//!   valid-token set; `/api/*` requests without a tracked token get 401
//! - Carts are keyed by the `X-User-Id` header
//! - Removing an absent item and clearing an empty cart are no-ops
//! - Bills price known items with per-item offers (melons are
//!   buy-one-get-one-free, limes are three-for-two) and skip unknown names
//! - Failure switches let tests force 401s or 500s at chosen endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = TestBackend::spawn().await;
//! let dir = tempfile::tempdir().unwrap();
//! let session = Session::new(&backend.client_config(dir.path()));
//! session.login("alice", &TestBackend::PASSWORD.into()).await.unwrap();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::extract::{Json, Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use greengrocer_client::api::types::{Bill, BillLine, CartContents, LoginResponse};
use greengrocer_client::config::ClientConfig;

/// Minor-unit prices for the fixed catalog, plus each item's offer.
const PRICES: &[(&str, i64, Offer)] = &[
    ("Apple", 50, Offer::None),
    ("Banana", 30, Offer::None),
    ("Melon", 120, Offer::BuyOneGetOneFree),
    ("Lime", 45, Offer::ThreeForTwo),
];

#[derive(Clone, Copy)]
enum Offer {
    None,
    BuyOneGetOneFree,
    ThreeForTwo,
}

impl Offer {
    const fn chargeable_quantity(self, count: u32) -> u32 {
        match self {
            Self::None => count,
            Self::BuyOneGetOneFree => count / 2 + count % 2,
            Self::ThreeForTwo => count - count / 3,
        }
    }
}

/// Headers captured from the most recent `/api/cart` request.
#[derive(Debug, Clone, Default)]
pub struct CapturedHeaders {
    pub bearer_token: Option<String>,
    pub user_id: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Default)]
struct BackendState {
    carts: Mutex<HashMap<String, Vec<String>>>,
    valid_tokens: Mutex<HashSet<String>>,
    last_cart_headers: Mutex<CapturedHeaders>,
    force_unauthorized: AtomicBool,
    omit_login_token: AtomicBool,
    fail_totals: AtomicBool,
    fail_mutations: AtomicBool,
    total_requests: AtomicUsize,
}

type SharedState = Arc<BackendState>;

/// An in-process fake cart backend listening on an ephemeral port.
pub struct TestBackend {
    base_url: String,
    state: SharedState,
}

impl TestBackend {
    /// The only password the fake login endpoint accepts.
    pub const PASSWORD: &'static str = "orchard";

    /// Start the backend on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound (test environment failure).
    pub async fn spawn() -> Self {
        let state = SharedState::default();
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake backend");
        let addr: SocketAddr = listener.local_addr().expect("listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend error");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL of the running backend.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this backend, with the credential
    /// slot under `dir`.
    ///
    /// # Panics
    ///
    /// Panics if the backend's own base URL fails to parse (unreachable).
    #[must_use]
    pub fn client_config(&self, dir: &Path) -> ClientConfig {
        ClientConfig {
            api_url: Url::parse(&self.base_url).expect("backend URL is valid"),
            credentials_path: dir.join("credentials.json"),
        }
    }

    /// The backend's current cart for `user` - the source of truth tests
    /// compare displayed quantities against.
    #[must_use]
    pub fn cart_of(&self, user: &str) -> Vec<String> {
        self.state
            .carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
            .cloned()
            .unwrap_or_default()
    }

    /// Seed a cart directly, bypassing the HTTP surface.
    pub fn seed_cart(&self, user: &str, items: Vec<String>) {
        self.state
            .carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.to_owned(), items);
    }

    /// When set, every `/api/*` request is answered with 401 regardless of
    /// the presented token.
    pub fn force_unauthorized(&self, on: bool) {
        self.state.force_unauthorized.store(on, Ordering::SeqCst);
    }

    /// When set, login succeeds but the response body omits `accessToken`.
    pub fn omit_login_token(&self, on: bool) {
        self.state.omit_login_token.store(on, Ordering::SeqCst);
    }

    /// When set, `POST /api/cart/total` answers 500.
    pub fn fail_totals(&self, on: bool) {
        self.state.fail_totals.store(on, Ordering::SeqCst);
    }

    /// When set, cart mutation endpoints answer 500.
    pub fn fail_mutations(&self, on: bool) {
        self.state.fail_mutations.store(on, Ordering::SeqCst);
    }

    /// Number of bill computations served so far.
    #[must_use]
    pub fn total_request_count(&self) -> usize {
        self.state.total_requests.load(Ordering::SeqCst)
    }

    /// Headers seen on the most recent `GET /api/cart`.
    #[must_use]
    pub fn last_cart_headers(&self) -> CapturedHeaders {
        self.state
            .last_cart_headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/api/cart", get(get_cart).delete(clear_cart))
        .route("/api/cart/items", post(add_item))
        .route("/api/cart/items/{name}", delete(remove_item))
        .route("/api/cart/total", post(total))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct AddItemPayload {
    item: String,
}

fn mint_token(username: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = json!({"sub": username, "iat": Utc::now().timestamp()});
    let payload =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).expect("claims serialize"));
    format!("{header}.{payload}.fake-signature")
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

fn user_id(headers: &HeaderMap) -> String {
    headers
        .get("X-User-Id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anon")
        .to_owned()
}

/// 401 unless the request carries a token minted by a prior login.
fn authorize(state: &BackendState, headers: &HeaderMap) -> Result<(), StatusCode> {
    if state.force_unauthorized.load(Ordering::SeqCst) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = bearer_token(headers).ok_or(StatusCode::UNAUTHORIZED)?;
    let tokens = state
        .valid_tokens
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if tokens.contains(&token) {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn login(State(state): State<SharedState>, Json(payload): Json<LoginPayload>) -> Response {
    if payload.username.is_empty() || payload.password != TestBackend::PASSWORD {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if state.omit_login_token.load(Ordering::SeqCst) {
        return Json(LoginResponse { access_token: None }).into_response();
    }

    let token = mint_token(&payload.username);
    state
        .valid_tokens
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(token.clone());

    Json(LoginResponse {
        access_token: Some(token),
    })
    .into_response()
}

async fn get_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    *state
        .last_cart_headers
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = CapturedHeaders {
        bearer_token: bearer_token(&headers),
        user_id: headers
            .get("X-User-Id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        request_id: headers
            .get("X-Request-Id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
    };

    if let Err(status) = authorize(&state, &headers) {
        return status.into_response();
    }

    let cart = state
        .carts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&user_id(&headers))
        .cloned()
        .unwrap_or_default();

    Json(CartContents { cart }).into_response()
}

async fn add_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<AddItemPayload>,
) -> Response {
    if let Err(status) = authorize(&state, &headers) {
        return status.into_response();
    }
    if state.fail_mutations.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    state
        .carts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(user_id(&headers))
        .or_default()
        .push(payload.item);

    StatusCode::OK.into_response()
}

async fn remove_item(
    State(state): State<SharedState>,
    headers: HeaderMap,
    UrlPath(name): UrlPath<String>,
) -> Response {
    if let Err(status) = authorize(&state, &headers) {
        return status.into_response();
    }
    if state.fail_mutations.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let mut carts = state
        .carts
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(cart) = carts.get_mut(&user_id(&headers))
        && let Some(position) = cart.iter().position(|item| item.eq_ignore_ascii_case(&name))
    {
        cart.remove(position);
    }

    // Removing an absent item is a no-op, per the backend contract
    StatusCode::OK.into_response()
}

async fn clear_cart(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(status) = authorize(&state, &headers) {
        return status.into_response();
    }
    if state.fail_mutations.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    state
        .carts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&user_id(&headers));

    StatusCode::OK.into_response()
}

async fn total(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    state.total_requests.fetch_add(1, Ordering::SeqCst);

    if let Err(status) = authorize(&state, &headers) {
        return status.into_response();
    }
    if state.fail_totals.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let cart = state
        .carts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&user_id(&headers))
        .cloned()
        .unwrap_or_default();

    Json(compute_bill(&cart)).into_response()
}

/// Price a cart the way the real backend does: count case-insensitively in
/// first-seen order, apply per-item offers, skip unknown names.
fn compute_bill(cart: &[String]) -> Bill {
    let mut counts: Vec<(&'static str, i64, Offer, u32)> = Vec::new();

    for raw in cart {
        let Some(&(name, price, offer)) = PRICES
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(raw))
        else {
            continue;
        };

        match counts.iter_mut().find(|(existing, ..)| *existing == name) {
            Some(entry) => entry.3 += 1,
            None => counts.push((name, price, offer, 1)),
        }
    }

    let lines: Vec<BillLine> = counts
        .into_iter()
        .map(|(name, unit_price_pence, offer, qty)| {
            let chargeable_qty = offer.chargeable_quantity(qty);
            BillLine {
                item: name.to_owned(),
                qty,
                chargeable_qty,
                unit_price_pence,
                line_total_pence: i64::from(chargeable_qty) * unit_price_pence,
            }
        })
        .collect();

    let total_pence: i64 = lines.iter().map(|line| line.line_total_pence).sum();

    Bill {
        currency: "GBP".to_owned(),
        total_pence,
        total_formatted: format_gbp(total_pence),
        lines,
    }
}

fn format_gbp(pence: i64) -> String {
    format!("£{}.{:02}", pence / 100, pence % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_chargeable_quantities() {
        assert_eq!(Offer::None.chargeable_quantity(4), 4);

        // Buy one get one free: ceil(n / 2)
        assert_eq!(Offer::BuyOneGetOneFree.chargeable_quantity(1), 1);
        assert_eq!(Offer::BuyOneGetOneFree.chargeable_quantity(2), 1);
        assert_eq!(Offer::BuyOneGetOneFree.chargeable_quantity(5), 3);

        // Three for two: n - floor(n / 3)
        assert_eq!(Offer::ThreeForTwo.chargeable_quantity(2), 2);
        assert_eq!(Offer::ThreeForTwo.chargeable_quantity(3), 2);
        assert_eq!(Offer::ThreeForTwo.chargeable_quantity(7), 5);
    }

    #[test]
    fn test_compute_bill_skips_unknown_items() {
        let bill = compute_bill(&["Apple".to_owned(), "Durian".to_owned()]);
        assert_eq!(bill.lines.len(), 1);
        assert_eq!(bill.total_pence, 50);
        assert_eq!(bill.total_formatted, "£0.50");
    }

    #[test]
    fn test_compute_bill_counts_case_insensitively() {
        let bill = compute_bill(&["apple".to_owned(), "APPLE".to_owned()]);
        assert_eq!(bill.lines.len(), 1);
        assert_eq!(bill.lines[0].qty, 2);
        assert_eq!(bill.lines[0].item, "Apple");
    }

    #[test]
    fn test_format_gbp() {
        assert_eq!(format_gbp(0), "£0.00");
        assert_eq!(format_gbp(50), "£0.50");
        assert_eq!(format_gbp(235), "£2.35");
    }
}
