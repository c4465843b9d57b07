//! Session domain models.
//!
//! Represents the client's belief about the current user: who they are and
//! whether the initial identity check is still in flight.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity and profile snapshot of the signed-in user.
///
/// Backend responses are inconsistent about field shape; this struct is only
/// ever produced by [`normalize_user_payload`](super::normalize::normalize_user_payload),
/// which folds the variants into this one canonical form. Display-only
/// fields the backend may attach are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Canonical user id.
    pub id: String,
    /// Account type, e.g. "student" or "agent".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Any further profile fields the backend returned, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    /// Creates a minimal user with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_type: None,
            first_name: None,
            last_name: None,
            email: None,
            extra: Map::new(),
        }
    }

    /// Creates a user with an id and account type.
    pub fn with_type(id: impl Into<String>, user_type: impl Into<String>) -> Self {
        Self {
            user_type: Some(user_type.into()),
            ..Self::new(id)
        }
    }
}

/// The singleton session state owned by the session store.
///
/// `is_authenticated` is derived from the presence of a user rather than
/// stored separately, so the two can never disagree.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// The current user, or `None` when anonymous.
    pub user: Option<SessionUser>,
    /// True only while the initial bootstrap check is in flight.
    pub loading: bool,
}

impl Session {
    /// State at application start, before bootstrap has resolved.
    pub fn starting() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    /// Resolved anonymous state.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            loading: false,
        }
    }

    /// Resolved authenticated state.
    pub fn authenticated(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            loading: false,
        }
    }

    /// True iff a user is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
