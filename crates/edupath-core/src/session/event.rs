//! Identity change events published by the session store.

use crate::session::model::SessionUser;

/// Who the client currently believes is using the app.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    /// No authenticated session; favorites live in local device storage.
    Anonymous,
    /// Cookie-backed authenticated session.
    Authenticated(SessionUser),
}

impl Identity {
    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }
}

/// A point-in-time view of the identity, tagged with a monotonic epoch.
///
/// The epoch increments on every identity transition. Consumers that kick
/// off asynchronous work in response to a transition capture the epoch first
/// and compare it against the channel's latest value before committing
/// results, so a slow response for an old identity can never overwrite the
/// state of a newer one.
#[derive(Debug, Clone)]
pub struct IdentitySnapshot {
    /// Monotonic transition counter; 0 is the pre-bootstrap state.
    pub epoch: u64,
    pub identity: Identity,
}

impl IdentitySnapshot {
    /// The state published before bootstrap has resolved.
    pub fn initial() -> Self {
        Self {
            epoch: 0,
            identity: Identity::Anonymous,
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.identity.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated()
    }
}
