//! Local persistence seams for session-adjacent state.

use crate::error::Result;
use crate::session::model::SessionUser;

/// Best-effort cache of the last confirmed user snapshot.
///
/// Read optimistically at startup so the UI can render a user-ish shell
/// before the next bootstrap check confirms it. This is a UX hint only and
/// must never be treated as proof of authentication.
pub trait SessionSnapshotCache: Send + Sync {
    fn save(&self, user: &SessionUser) -> Result<()>;
    fn load(&self) -> Result<Option<SessionUser>>;
    fn clear(&self) -> Result<()>;
}

/// Holds the "return to after login" target captured when a session expires
/// mid-navigation.
pub trait ReturnPathStore: Send + Sync {
    fn save_return_path(&self, path: &str) -> Result<()>;
    /// Reads and clears the stored target.
    fn take_return_path(&self) -> Result<Option<String>>;
}
