//! Item id extraction tolerant of backend field-name drift.
//!
//! Catalog payloads spell their id as `id`, `ID`, or `Id` depending on the
//! endpoint that produced them. All id lookups in the client go through
//! these helpers so the inconsistency never spreads.

use serde_json::Value;

/// Accepted id field spellings, checked in order.
pub const ID_KEYS: [&str; 3] = ["id", "ID", "Id"];

/// Converts an id-bearing JSON value (string or integer) to its canonical
/// string form.
pub fn id_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts the item id from a catalog payload, accepting any of the
/// [`ID_KEYS`] spellings. Returns `None` when no usable id is present.
pub fn extract_item_id(item: &Value) -> Option<String> {
    let obj = item.as_object()?;
    ID_KEYS
        .iter()
        .find_map(|key| obj.get(*key))
        .and_then(id_value_to_string)
}

/// True when the payload's id (under any accepted spelling) equals `id`.
pub fn item_id_matches(item: &Value, id: &str) -> bool {
    extract_item_id(item).as_deref() == Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_all_spellings() {
        assert_eq!(extract_item_id(&json!({"id": "42"})).as_deref(), Some("42"));
        assert_eq!(extract_item_id(&json!({"ID": 42})).as_deref(), Some("42"));
        assert_eq!(extract_item_id(&json!({"Id": "x9"})).as_deref(), Some("x9"));
    }

    #[test]
    fn test_missing_or_unusable_id() {
        assert_eq!(extract_item_id(&json!({"name": "Biology 101"})), None);
        assert_eq!(extract_item_id(&json!({"id": ""})), None);
        assert_eq!(extract_item_id(&json!({"id": null})), None);
        assert_eq!(extract_item_id(&json!("not an object")), None);
    }

    #[test]
    fn test_first_spelling_wins() {
        let item = json!({"id": "1", "ID": "2"});
        assert_eq!(extract_item_id(&item).as_deref(), Some("1"));
    }

    #[test]
    fn test_item_id_matches() {
        assert!(item_id_matches(&json!({"Id": 5}), "5"));
        assert!(!item_id_matches(&json!({"Id": 5}), "6"));
    }
}
