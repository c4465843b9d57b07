//! Local persistence layer for the Edupath client.
//!
//! File-backed implementations of the core storage seams: the anonymous
//! favorites document, the optimistic session snapshot, and the post-login
//! return path, all living under one platform-resolved directory.

pub mod guest_favorites;
pub mod paths;
pub mod state_cache;

pub use guest_favorites::GuestFavoritesFile;
pub use paths::EdupathPaths;
pub use state_cache::StateCache;
