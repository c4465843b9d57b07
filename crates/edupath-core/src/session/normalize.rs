//! Normalization of inconsistent backend identity payloads.
//!
//! The backend returns identity fields either nested under `user` or
//! flattened at the top level, and spells the id as `id`, `ID`, `Id`, or
//! `userId`. This module is the single place those shapes are reconciled;
//! nothing past this boundary ever sees the raw variants.

use crate::favorites::item_id::{extract_item_id, id_value_to_string};
use crate::session::model::SessionUser;
use serde_json::{Map, Value};

/// Fields lifted into named `SessionUser` fields; everything else lands in
/// `extra`.
const KNOWN_KEYS: [&str; 8] = [
    "id", "ID", "Id", "userId", "userType", "firstName", "lastName", "email",
];

/// Folds a login/whoami response body into a canonical [`SessionUser`].
///
/// Accepts both `{ "user": { ... } }` and a flattened top-level shape.
/// Returns `None` when no usable id can be found, which callers treat as an
/// unauthenticated response.
pub fn normalize_user_payload(payload: &Value) -> Option<SessionUser> {
    let source = match payload.get("user") {
        Some(nested) if nested.is_object() => nested,
        _ => payload,
    };
    let obj = source.as_object()?;

    let id = obj
        .get("userId")
        .and_then(id_value_to_string)
        .or_else(|| extract_item_id(source))?;

    let get_str = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_owned);

    let mut extra = Map::new();
    for (key, value) in obj {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            extra.insert(key.clone(), value.clone());
        }
    }

    Some(SessionUser {
        id,
        user_type: get_str("userType"),
        first_name: get_str("firstName"),
        last_name: get_str("lastName"),
        email: get_str("email"),
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_user_shape() {
        let payload = json!({
            "user": {
                "id": "12",
                "userType": "student",
                "firstName": "Lena",
                "email": "lena@example.com"
            }
        });

        let user = normalize_user_payload(&payload).unwrap();
        assert_eq!(user.id, "12");
        assert_eq!(user.user_type.as_deref(), Some("student"));
        assert_eq!(user.first_name.as_deref(), Some("Lena"));
    }

    #[test]
    fn test_flattened_shape_with_user_id() {
        let payload = json!({"userId": 7, "userType": "student"});

        let user = normalize_user_payload(&payload).unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.user_type.as_deref(), Some("student"));
    }

    #[test]
    fn test_capitalized_id_spelling() {
        let payload = json!({"Id": 31, "email": "a@b.c"});

        let user = normalize_user_payload(&payload).unwrap();
        assert_eq!(user.id, "31");
        assert_eq!(user.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let payload = json!({"id": "3", "avatarUrl": "x.png"});

        let user = normalize_user_payload(&payload).unwrap();
        assert_eq!(
            user.extra.get("avatarUrl").and_then(|v| v.as_str()),
            Some("x.png")
        );
    }

    #[test]
    fn test_payload_without_id_is_rejected() {
        assert!(normalize_user_payload(&json!({"userType": "student"})).is_none());
        assert!(normalize_user_payload(&json!({"user": {}})).is_none());
        assert!(normalize_user_payload(&json!(null)).is_none());
    }
}
