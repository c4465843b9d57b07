//! REST transport layer for the Edupath client.
//!
//! This crate implements the core gateway traits ([`AuthGateway`] and
//! [`FavoritesApi`]) against the backend REST API, and hosts the single
//! transport-level 401 interception point.
//!
//! [`AuthGateway`]: edupath_core::session::AuthGateway
//! [`FavoritesApi`]: edupath_core::favorites::FavoritesApi

pub mod client;
pub mod expiry;

pub use client::ApiClient;
pub use expiry::{AuthExpiryNotifier, AuthExpiryObserver};
