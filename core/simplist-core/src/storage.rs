//! Storage configuration and path management for SimpList.
//!
//! Every file the widget, the host daemon and the debug tools touch is
//! resolved here:
//!
//! - `~/.simplist/groups/<app-group>.json` (shared key-value namespaces)
//! - `~/.simplist/widget.toml` (widget configuration)
//! - `~/.simplist/widget-host.sock` (host bridge socket)
//! - `~/.simplist/logs/` (rolling CLI logs)
//!
//! Production code uses [`StorageConfig::from_env`]. Tests use
//! [`StorageConfig::with_root`] with a temp directory for isolation.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, SimplistError};

/// Overrides the storage root (otherwise `~/.simplist`).
pub const HOME_ENV: &str = "SIMPLIST_HOME";

const ROOT_DIR_NAME: &str = ".simplist";
const SOCKET_NAME: &str = "widget-host.sock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    /// Resolves the root from `SIMPLIST_HOME`, falling back to `~/.simplist`.
    pub fn from_env() -> Result<Self> {
        if let Some(root) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }
        let home = dirs::home_dir().ok_or(SimplistError::HomeDirNotFound)?;
        Ok(Self::with_root(home.join(ROOT_DIR_NAME)))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Shared Namespaces
    // ─────────────────────────────────────────────────────────────────────────────

    /// Directory holding one JSON file per app group.
    pub fn groups_dir(&self) -> PathBuf {
        self.root.join("groups")
    }

    /// Backing file for an app group namespace.
    /// Example: ~/.simplist/groups/group.com.simplist.app.json
    pub fn namespace_file(&self, app_group: &str) -> PathBuf {
        self.groups_dir().join(format!("{}.json", app_group))
    }

    /// Advisory lock serializing read-merge-write cycles on a namespace file.
    pub fn namespace_lock_file(&self, app_group: &str) -> PathBuf {
        self.groups_dir().join(format!("{}.json.lock", app_group))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Global Files
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn config_file(&self) -> PathBuf {
        self.root.join("widget.toml")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.root.join(SOCKET_NAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_file_is_named_after_app_group() {
        let storage = StorageConfig::with_root(PathBuf::from("/tmp/simplist"));
        assert_eq!(
            storage.namespace_file("group.com.simplist.app"),
            PathBuf::from("/tmp/simplist/groups/group.com.simplist.app.json")
        );
        assert_eq!(
            storage.namespace_lock_file("group.com.simplist.app"),
            PathBuf::from("/tmp/simplist/groups/group.com.simplist.app.json.lock")
        );
    }

    #[test]
    fn global_files_live_under_root() {
        let storage = StorageConfig::with_root(PathBuf::from("/tmp/simplist"));
        assert_eq!(storage.config_file(), PathBuf::from("/tmp/simplist/widget.toml"));
        assert_eq!(
            storage.socket_path(),
            PathBuf::from("/tmp/simplist/widget-host.sock")
        );
        assert_eq!(storage.logs_dir(), PathBuf::from("/tmp/simplist/logs"));
    }
}
