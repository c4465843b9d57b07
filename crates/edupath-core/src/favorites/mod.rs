//! Favorites domain module.
//!
//! Models for the favorited-items collection, the backend seams, and the
//! id-extraction helpers that absorb backend field-name drift.

pub mod backend;
pub mod item_id;
pub mod model;

pub use backend::{FavoriteMutation, FavoritesApi, GuestFavoritesStore, RemoteFavorite};
pub use item_id::{extract_item_id, id_value_to_string, item_id_matches};
pub use model::{FavoriteCollection, FavoriteEntry, FavoriteKind};
