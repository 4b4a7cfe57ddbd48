//! # cuota_core
//!
//! Session and token lifecycle for the Cuota loan-management API:
//! token claim decoding, a persisted session store, an authenticated
//! request wrapper with single refresh-and-retry, a background
//! expiration poller, and role-based navigation decisions.

pub mod api;
pub mod client;
pub mod config;
pub mod guard;
pub mod jwt;
pub mod models;
pub mod poller;
pub mod session;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
