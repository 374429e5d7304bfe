//! Greengrocer Core - Shared types library.
//!
//! This crate provides common types used across all Greengrocer components:
//! - `client` - Typed client library for the cart backend's HTTP API
//! - `cli` - Terminal front-end (`grocer`)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! credential handling. This keeps it lightweight and allows it to be used
//! anywhere, including inside test fixtures.
//!
//! # Modules
//!
//! - [`types`] - The fixed item catalog, derived quantity maps, minor-unit
//!   prices, and the user subject newtype

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
