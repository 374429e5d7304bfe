//! Greengrocer client library.
//!
//! Typed access to the cart backend's HTTP API, covering the session
//! lifecycle (login, logout, credential persistence, identity decoding) and
//! the cart synchronization protocol that keeps local state consistent with
//! the server-authoritative cart and bill.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local cart mutation, every
//!   change is a round trip followed by a full reload
//! - [`session::Session`] owns the durable credential slot and hands out
//!   dispatchers wired to invalidate the session on HTTP 401
//! - [`api::ApiClient`] attaches `Authorization` and `X-User-Id` headers at
//!   dispatch time, so it always observes the latest credential
//! - [`cart::CartSync`] runs each mutation as one compound
//!   mutate-reload-recompute operation and exposes derived quantities
//!
//! # Example
//!
//! ```rust,ignore
//! use greengrocer_client::{cart::CartSync, config::ClientConfig, session::Session};
//! use greengrocer_core::CatalogItem;
//!
//! let config = ClientConfig::from_env()?;
//! let session = Session::new(&config);
//! session.login("alice", &"password".into()).await?;
//!
//! let mut cart = CartSync::new(session.api());
//! cart.add_item(CatalogItem::Apple).await?;
//! println!("{}", cart.quantities());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod session;
