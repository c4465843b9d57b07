//! File-backed favorites storage for anonymous users.
//!
//! One JSON document, `{"courses": [...], "programs": [...]}`, where each
//! entry is the catalog item payload with the id normalized to the canonical
//! `id` key plus `type` and `addedAt` bookkeeping fields. The document is the
//! source of truth for guests; the in-memory collection mirrors it.

use chrono::{DateTime, Utc};
use edupath_core::error::{EdupathError, Result};
use edupath_core::favorites::{
    extract_item_id, item_id_matches, FavoriteCollection, FavoriteEntry, FavoriteKind,
    GuestFavoritesStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// On-disk shape of the guest favorites document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct GuestDocument {
    #[serde(default)]
    courses: Vec<Value>,
    #[serde(default)]
    programs: Vec<Value>,
}

impl GuestDocument {
    fn set(&self, kind: FavoriteKind) -> &Vec<Value> {
        match kind {
            FavoriteKind::Course => &self.courses,
            FavoriteKind::Program => &self.programs,
        }
    }

    fn set_mut(&mut self, kind: FavoriteKind) -> &mut Vec<Value> {
        match kind {
            FavoriteKind::Course => &mut self.courses,
            FavoriteKind::Program => &mut self.programs,
        }
    }
}

/// Guest favorites persisted to a single JSON file.
pub struct GuestFavoritesFile {
    path: PathBuf,
}

impl GuestFavoritesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_document(&self) -> Result<GuestDocument> {
        if !self.path.exists() {
            return Ok(GuestDocument::default());
        }

        let json = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&json) {
            Ok(document) => Ok(document),
            Err(err) => {
                // An unreadable document is treated as empty rather than
                // wedging every guest operation behind a parse error.
                warn!(error = %err, path = %self.path.display(),
                    "guest favorites document is corrupt, starting empty");
                Ok(GuestDocument::default())
            }
        }
    }

    fn write_document(&self, document: &GuestDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Rewrites the stored entry with the canonical id key and bookkeeping
    /// fields.
    fn normalize_entry(item: &Value, id: &str, kind: FavoriteKind) -> Value {
        let mut entry = match item.as_object() {
            Some(obj) => obj.clone(),
            None => serde_json::Map::new(),
        };
        entry.remove("ID");
        entry.remove("Id");
        entry.insert("id".to_string(), Value::String(id.to_string()));
        entry.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        entry.insert(
            "addedAt".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        Value::Object(entry)
    }

    fn entry_to_favorite(entry: &Value) -> Option<FavoriteEntry> {
        let id = extract_item_id(entry)?;
        let added_at = entry
            .get("addedAt")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        Some(FavoriteEntry {
            id,
            added_at,
            favorite_id: None,
            item: entry.clone(),
        })
    }
}

impl GuestFavoritesStore for GuestFavoritesFile {
    fn load(&self) -> Result<FavoriteCollection> {
        let document = self.read_document()?;
        let mut collection = FavoriteCollection::default();

        for kind in [FavoriteKind::Course, FavoriteKind::Program] {
            for entry in document.set(kind) {
                match Self::entry_to_favorite(entry) {
                    Some(favorite) => {
                        collection.insert(kind, favorite);
                    }
                    None => warn!(%kind, "skipping stored guest favorite without an id"),
                }
            }
        }

        Ok(collection)
    }

    fn add(&self, item: &Value, kind: FavoriteKind) -> Result<bool> {
        let id = extract_item_id(item)
            .ok_or_else(|| EdupathError::internal("guest favorite payload has no id"))?;

        let mut document = self.read_document()?;
        if document.set(kind).iter().any(|entry| item_id_matches(entry, &id)) {
            return Ok(false);
        }

        let entry = Self::normalize_entry(item, &id, kind);
        document.set_mut(kind).push(entry);
        self.write_document(&document)?;
        Ok(true)
    }

    fn remove(&self, id: &str, kind: FavoriteKind) -> Result<bool> {
        let mut document = self.read_document()?;
        let set = document.set_mut(kind);
        let before = set.len();
        set.retain(|entry| !item_id_matches(entry, id));

        if set.len() == before {
            return Ok(false);
        }
        self.write_document(&document)?;
        Ok(true)
    }

    fn contains(&self, id: &str, kind: FavoriteKind) -> Result<bool> {
        let document = self.read_document()?;
        Ok(document.set(kind).iter().any(|entry| item_id_matches(entry, id)))
    }
}
