//! Durable cache for session-adjacent client state.
//!
//! Holds the optimistic user snapshot and the post-login return path. The
//! snapshot lets a reloaded app render a user-ish shell before the next
//! bootstrap check confirms it; it is a display hint, never proof of
//! authentication.

use edupath_core::error::Result;
use edupath_core::session::{ReturnPathStore, SessionSnapshotCache, SessionUser};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// File-backed implementation of the session-adjacent caches.
pub struct StateCache {
    user_path: PathBuf,
    return_path: PathBuf,
}

impl StateCache {
    pub fn new(user_path: impl Into<PathBuf>, return_path: impl Into<PathBuf>) -> Self {
        Self {
            user_path: user_path.into(),
            return_path: return_path.into(),
        }
    }
}

impl SessionSnapshotCache for StateCache {
    fn save(&self, user: &SessionUser) -> Result<()> {
        let json = serde_json::to_string_pretty(user)?;
        fs::write(&self.user_path, json)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<SessionUser>> {
        if !self.user_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.user_path)?;
        match serde_json::from_str(&json) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!(error = %err, "user snapshot is unreadable, ignoring it");
                Ok(None)
            }
        }
    }

    fn clear(&self) -> Result<()> {
        if self.user_path.exists() {
            fs::remove_file(&self.user_path)?;
        }
        Ok(())
    }
}

impl ReturnPathStore for StateCache {
    fn save_return_path(&self, path: &str) -> Result<()> {
        fs::write(&self.return_path, path)?;
        Ok(())
    }

    fn take_return_path(&self) -> Result<Option<String>> {
        if !self.return_path.exists() {
            return Ok(None);
        }

        let target = fs::read_to_string(&self.return_path)?;
        fs::remove_file(&self.return_path)?;
        let target = target.trim().to_string();
        if target.is_empty() {
            Ok(None)
        } else {
            Ok(Some(target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(temp_dir: &TempDir) -> StateCache {
        StateCache::new(
            temp_dir.path().join("user.json"),
            temp_dir.path().join("return_path.txt"),
        )
    }

    #[test]
    fn test_snapshot_round_trip_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);

        assert_eq!(cache.load().unwrap(), None);

        let user = SessionUser::with_type("12", "student");
        cache.save(&user).unwrap();
        assert_eq!(cache.load().unwrap(), Some(user));

        cache.clear().unwrap();
        assert_eq!(cache.load().unwrap(), None);
        // Clearing twice is fine.
        cache.clear().unwrap();
    }

    #[test]
    fn test_unreadable_snapshot_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("user.json"), "{broken").unwrap();

        let cache = cache_in(&temp_dir);
        assert_eq!(cache.load().unwrap(), None);
    }

    #[test]
    fn test_return_path_is_taken_once() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);

        assert_eq!(cache.take_return_path().unwrap(), None);

        cache
            .save_return_path("/dashboard/messages?x=1")
            .unwrap();
        assert_eq!(
            cache.take_return_path().unwrap(),
            Some("/dashboard/messages?x=1".to_string())
        );
        assert_eq!(cache.take_return_path().unwrap(), None);
    }
}
