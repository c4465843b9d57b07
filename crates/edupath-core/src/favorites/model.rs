//! Favorites domain models.
//!
//! A favorite is a user-saved bookmark pointing at a course or program. The
//! collection has set semantics per kind: inserting an id twice is a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Discriminator between the two favoritable catalog types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Course,
    Program,
}

impl FavoriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteKind::Course => "course",
            FavoriteKind::Program => "program",
        }
    }

    /// The id field name the backend expects for this kind.
    pub fn id_field(&self) -> &'static str {
        match self {
            FavoriteKind::Course => "courseId",
            FavoriteKind::Program => "programId",
        }
    }
}

impl fmt::Display for FavoriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One favorited item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    /// Item id, unique within its set.
    pub id: String,
    /// When the favorite was created.
    pub added_at: DateTime<Utc>,
    /// Server-side join-row id, present only for favorites loaded from the
    /// backend. Entries added locally while authenticated stay `None` until
    /// the next full load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_id: Option<String>,
    /// Item display payload, kept as the backend shaped it.
    #[serde(default)]
    pub item: Value,
}

impl FavoriteEntry {
    /// Creates an entry added now, with no server bookkeeping yet.
    pub fn new(id: impl Into<String>, item: Value) -> Self {
        Self {
            id: id.into(),
            added_at: Utc::now(),
            favorite_id: None,
            item,
        }
    }
}

/// The per-identity favorites collection: two disjoint sets, one per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoriteCollection {
    pub courses: Vec<FavoriteEntry>,
    pub programs: Vec<FavoriteEntry>,
}

impl FavoriteCollection {
    pub fn set(&self, kind: FavoriteKind) -> &[FavoriteEntry] {
        match kind {
            FavoriteKind::Course => &self.courses,
            FavoriteKind::Program => &self.programs,
        }
    }

    fn set_mut(&mut self, kind: FavoriteKind) -> &mut Vec<FavoriteEntry> {
        match kind {
            FavoriteKind::Course => &mut self.courses,
            FavoriteKind::Program => &mut self.programs,
        }
    }

    /// Inserts an entry, preserving id uniqueness within the set.
    ///
    /// Returns `false` (and leaves the set unchanged) when the id is already
    /// present.
    pub fn insert(&mut self, kind: FavoriteKind, entry: FavoriteEntry) -> bool {
        let set = self.set_mut(kind);
        if set.iter().any(|existing| existing.id == entry.id) {
            return false;
        }
        set.push(entry);
        true
    }

    /// Removes the entry with the given id. Returns `false` when absent.
    pub fn remove(&mut self, kind: FavoriteKind, id: &str) -> bool {
        let set = self.set_mut(kind);
        let before = set.len();
        set.retain(|entry| entry.id != id);
        set.len() != before
    }

    pub fn contains(&self, kind: FavoriteKind, id: &str) -> bool {
        self.set(kind).iter().any(|entry| entry.id == id)
    }

    /// Cardinality of one set, or of both combined when `kind` is `None`.
    pub fn count(&self, kind: Option<FavoriteKind>) -> usize {
        match kind {
            Some(kind) => self.set(kind).len(),
            None => self.courses.len() + self.programs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() && self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str) -> FavoriteEntry {
        FavoriteEntry::new(id, json!({"id": id}))
    }

    #[test]
    fn test_insert_is_duplicate_free() {
        let mut collection = FavoriteCollection::default();

        assert!(collection.insert(FavoriteKind::Course, entry("42")));
        assert!(!collection.insert(FavoriteKind::Course, entry("42")));
        assert_eq!(collection.count(Some(FavoriteKind::Course)), 1);

        // Same id in the other set is a distinct favorite.
        assert!(collection.insert(FavoriteKind::Program, entry("42")));
        assert_eq!(collection.count(None), 2);
    }

    #[test]
    fn test_remove_and_contains_reflect_net_effect() {
        let mut collection = FavoriteCollection::default();
        collection.insert(FavoriteKind::Program, entry("5"));

        assert!(collection.contains(FavoriteKind::Program, "5"));
        assert!(collection.remove(FavoriteKind::Program, "5"));
        assert!(!collection.contains(FavoriteKind::Program, "5"));
        assert!(!collection.remove(FavoriteKind::Program, "5"));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_add_remove_sequence_never_duplicates() {
        let mut collection = FavoriteCollection::default();
        for _ in 0..3 {
            collection.insert(FavoriteKind::Course, entry("a"));
            collection.insert(FavoriteKind::Course, entry("b"));
            collection.remove(FavoriteKind::Course, "a");
        }
        assert!(!collection.contains(FavoriteKind::Course, "a"));
        assert!(collection.contains(FavoriteKind::Course, "b"));
        assert_eq!(collection.count(Some(FavoriteKind::Course)), 1);
    }

    #[test]
    fn test_kind_serde_and_id_field() {
        assert_eq!(
            serde_json::to_string(&FavoriteKind::Course).unwrap(),
            "\"course\""
        );
        assert_eq!(FavoriteKind::Course.id_field(), "courseId");
        assert_eq!(FavoriteKind::Program.id_field(), "programId");
    }
}
