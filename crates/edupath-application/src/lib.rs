//! Application layer for the Edupath client core.
//!
//! This crate provides the two stores view components consume — the session
//! store and the favorites store — plus the auth-expiry redirect glue and
//! the root wiring that assembles them over the transport and storage
//! layers.

pub mod auth_expiry;
pub mod favorites_store;
pub mod platform;
pub mod session_store;

pub use auth_expiry::AuthExpiryRedirect;
pub use favorites_store::FavoritesStore;
pub use platform::ClientPlatform;
pub use session_store::SessionStore;
