//! Authentication gateway trait and its operation payloads/outcomes.
//!
//! The gateway abstracts the backend auth endpoints so the session store can
//! be exercised against in-memory fakes. Expected failure paths (wrong
//! password, blocked account, rejected registration) come back as tagged
//! outcomes, never as `Err` — login failure is routine, not exceptional.

use crate::error::Result;
use crate::session::model::SessionUser;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Login credentials posted to the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration payload. Additional backend-specific fields go in `extra`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a login attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Authenticated; the user payload has already been normalized.
    Success(SessionUser),
    /// The account exists but is blocked (403 with the blocked indicator).
    /// Views show a dedicated message for this case.
    Blocked { message: String },
    /// Any other failure, with the server's message when one was present.
    Failed { message: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Outcome of a registration attempt. Registration never mutates the
/// session; callers chain an explicit login.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Accepted,
    Rejected { message: String },
}

impl RegisterOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Backend authentication operations.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Cookie-authenticated "who am I" check.
    ///
    /// `Ok(None)` means the backend answered but no session exists.
    /// Transport failures surface as `Err`; the session store maps both to
    /// an anonymous session.
    async fn who_am_i(&self) -> Result<Option<SessionUser>>;

    /// Posts credentials and reports the tagged outcome.
    async fn login(&self, credentials: &Credentials) -> LoginOutcome;

    /// Asks the backend to invalidate the server-side session.
    ///
    /// Callers treat failures as best-effort; client-side logout proceeds
    /// regardless.
    async fn logout(&self) -> Result<()>;

    /// Posts registration data and reports the tagged outcome.
    async fn register(&self, registration: &Registration) -> RegisterOutcome;
}
