//! Core domain layer for the Edupath client.
//!
//! Holds the models, boundary traits, and shared error type that the API,
//! infrastructure, and application crates build on. Nothing in this crate
//! performs IO; the seams (auth gateway, favorites backends, caches,
//! navigator) are implemented by the outer crates and injected into the
//! stores.

pub mod config;
pub mod error;
pub mod favorites;
pub mod session;

// Re-export common error type
pub use error::{EdupathError, Result};
