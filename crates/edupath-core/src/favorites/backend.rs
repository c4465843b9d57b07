//! Backend seams for the favorites store.
//!
//! Two sources of truth, one per identity: the backend favorites endpoints
//! for authenticated users, and the local guest document for anonymous ones.
//! The store switches the lens on identity change; it never merges the two.

use crate::error::Result;
use crate::favorites::item_id::{extract_item_id, id_value_to_string};
use crate::favorites::model::{FavoriteCollection, FavoriteEntry, FavoriteKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// One record from `GET /Favorites`.
///
/// The backend nests the item payload under `course`/`program` (sometimes
/// capitalized) next to join-row bookkeeping fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFavorite {
    /// Join-row identifier; string or number depending on the endpoint.
    #[serde(default)]
    pub favorite_id: Option<Value>,
    #[serde(rename = "type")]
    pub kind: FavoriteKind,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "Course")]
    pub course: Option<Value>,
    #[serde(default, alias = "Program")]
    pub program: Option<Value>,
}

impl RemoteFavorite {
    /// Extracts the nested item payload and converts the record into a
    /// collection entry. Returns `None` for malformed records (missing item
    /// payload or item id), which callers skip.
    pub fn into_entry(self) -> Option<(FavoriteKind, FavoriteEntry)> {
        let item = match self.kind {
            FavoriteKind::Course => self.course,
            FavoriteKind::Program => self.program,
        }?;
        let id = extract_item_id(&item)?;
        Some((
            self.kind,
            FavoriteEntry {
                id,
                added_at: self.added_at.unwrap_or_else(Utc::now),
                favorite_id: self.favorite_id.as_ref().and_then(id_value_to_string),
                item,
            },
        ))
    }
}

/// Tagged outcome of a favorites mutation.
///
/// Surfaced as a value rather than an error so views can decide whether to
/// revert an optimistic toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteMutation {
    /// The mutation changed the collection.
    Applied,
    /// Nothing to do: the item was already in (or already out of) the set.
    NoOp,
    /// The payload carried no usable id; logged and ignored.
    InvalidItem,
    /// The backend rejected the mutation.
    Failed { message: String },
}

impl FavoriteMutation {
    /// True for outcomes that leave the collection in the requested state.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied | Self::NoOp)
    }
}

/// Backend favorites endpoints, cookie-authenticated.
#[async_trait]
pub trait FavoritesApi: Send + Sync {
    async fn list_favorites(&self) -> Result<Vec<RemoteFavorite>>;
    async fn add_favorite(&self, id: &str, kind: FavoriteKind) -> Result<()>;
    async fn remove_favorite(&self, id: &str, kind: FavoriteKind) -> Result<()>;
    /// Server-authoritative "is this favorited" check.
    async fn favorite_status(&self, id: &str, kind: FavoriteKind) -> Result<bool>;
}

/// Local persistent storage for anonymous favorites.
///
/// Authoritative at query time for guests: `contains` goes to storage, not
/// to whatever happens to be mirrored in memory.
pub trait GuestFavoritesStore: Send + Sync {
    /// Reads the whole document.
    fn load(&self) -> Result<FavoriteCollection>;
    /// Adds an item if not already present. Returns `false` for the
    /// idempotent already-present case.
    fn add(&self, item: &Value, kind: FavoriteKind) -> Result<bool>;
    /// Removes an item by id, matching any accepted id spelling. Returns
    /// `false` when absent.
    fn remove(&self, id: &str, kind: FavoriteKind) -> Result<bool>;
    fn contains(&self, id: &str, kind: FavoriteKind) -> Result<bool>;
}
