//! Unified path management for Edupath client storage.
//!
//! All locally persisted client state (guest favorites, the optimistic user
//! snapshot, the post-login return path) lives under one directory resolved
//! here, so the layout stays consistent across platforms.

use edupath_core::error::{EdupathError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves and owns the client storage directory.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/edupath/           # platform config dir (Linux shown)
/// ├── favorites.json           # anonymous favorites document
/// ├── user.json                # optimistic session snapshot
/// └── return_path.txt          # post-login redirect target
/// ```
pub struct EdupathPaths {
    base_dir: PathBuf,
}

impl EdupathPaths {
    /// Creates the storage layout under the given base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Creates the storage layout at the platform config location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or
    /// created.
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EdupathError::config("cannot determine config directory"))?;
        Self::new(config_dir.join("edupath"))
    }

    /// The anonymous favorites document.
    pub fn guest_favorites_file(&self) -> PathBuf {
        self.base_dir.join("favorites.json")
    }

    /// The optimistic user snapshot.
    pub fn user_snapshot_file(&self) -> PathBuf {
        self.base_dir.join("user.json")
    }

    /// The stored "return to after login" target.
    pub fn return_path_file(&self) -> PathBuf {
        self.base_dir.join("return_path.txt")
    }
}
