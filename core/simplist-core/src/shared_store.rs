//! File-backed key-value namespace shared by the host app and the widget.
//!
//! Each app group is one JSON file under `~/.simplist/groups/`. Any process
//! that opens the same app group sees the same keys.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "revisions": { "todos": 4 },
//!   "values": { "todos": "[{\"text\":\"a\",\"isDone\":false}]" }
//! }
//! ```
//!
//! `revisions` counts successful writes per key. Plain [`SharedStore::set`]
//! ignores it (last write wins); [`SharedStore::compare_and_set`] refuses to
//! write when the key moved since the caller read it.
//!
//! # Defensive Design
//!
//! - Invalid app group → unavailable handle: reads are empty, writes vanish
//! - Empty file, corrupt JSON, unknown version → read as an empty namespace
//! - Missing fields → serde defaults
//!
//! # Atomic Writes
//!
//! Every write is temp file + rename, so readers never see a half-written
//! namespace. Read-merge-write cycles hold an advisory `flock` on a sidecar
//! lock file so two writers touching different keys don't drop each other's
//! key. Two writers on the same key still race; the later rename wins.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Result, SimplistError};
use crate::storage::StorageConfig;

const STORE_VERSION: u32 = 1;
const MAX_NAMESPACE_LEN: usize = 255;

/// The on-disk JSON structure for a namespace file.
#[derive(Debug, Serialize, Deserialize)]
struct NamespaceFile {
    /// Schema version. We only load files with version == 1.
    version: u32,
    #[serde(default)]
    revisions: BTreeMap<String, u64>,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

impl Default for NamespaceFile {
    fn default() -> Self {
        NamespaceFile {
            version: STORE_VERSION,
            revisions: BTreeMap::new(),
            values: BTreeMap::new(),
        }
    }
}

impl NamespaceFile {
    fn revision(&self, key: &str) -> u64 {
        self.revisions.get(key).copied().unwrap_or(0)
    }

    fn put(&mut self, key: &str, value: &str) -> u64 {
        let next = self.revision(key).saturating_add(1);
        self.values.insert(key.to_string(), value.to_string());
        self.revisions.insert(key.to_string(), next);
        next
    }
}

/// A value together with the write counter it was read at.
///
/// An absent key has revision 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: Option<String>,
    pub revision: u64,
}

/// Checks that an app group identifier can name a namespace file.
///
/// Accepts non-empty ASCII made of alphanumerics, `.`, `-` and `_`, which
/// covers reverse-DNS identifiers like `group.com.simplist.app`.
pub fn validate_namespace(app_group: &str) -> Result<()> {
    let valid = !app_group.is_empty()
        && app_group.len() <= MAX_NAMESPACE_LEN
        && !app_group.starts_with('.')
        && app_group
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(SimplistError::InvalidNamespace(app_group.to_string()))
    }
}

/// Handle to one shared namespace.
///
/// Handles are cheap and hold no file descriptors; open a fresh one for every
/// access rather than caching it.
#[derive(Debug, Clone)]
pub struct SharedStore {
    app_group: String,
    paths: Option<StorePaths>,
}

#[derive(Debug, Clone)]
struct StorePaths {
    file: PathBuf,
    lock: PathBuf,
}

impl SharedStore {
    /// Opens the namespace for `app_group`.
    ///
    /// Never fails: an invalid identifier or an uncreatable store directory
    /// yields an unavailable handle that reads as empty and discards writes.
    pub fn open(storage: &StorageConfig, app_group: &str) -> Self {
        if let Err(err) = validate_namespace(app_group) {
            warn!(error = %err, "Opening unavailable shared store");
            return SharedStore::unavailable(app_group);
        }

        if let Err(err) = fs::create_dir_all(storage.groups_dir()) {
            warn!(
                error = %err,
                app_group = %app_group,
                "Failed to create shared store directory; store unavailable"
            );
            return SharedStore::unavailable(app_group);
        }

        SharedStore {
            app_group: app_group.to_string(),
            paths: Some(StorePaths {
                file: storage.namespace_file(app_group),
                lock: storage.namespace_lock_file(app_group),
            }),
        }
    }

    pub fn unavailable(app_group: &str) -> Self {
        SharedStore {
            app_group: app_group.to_string(),
            paths: None,
        }
    }

    pub fn app_group(&self) -> &str {
        &self.app_group
    }

    pub fn is_available(&self) -> bool {
        self.paths.is_some()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.paths.as_ref().map(|paths| paths.file.as_path())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_versioned(key).value
    }

    pub fn get_versioned(&self, key: &str) -> Versioned {
        let Some(paths) = &self.paths else {
            return Versioned {
                value: None,
                revision: 0,
            };
        };
        let file = load_namespace(&paths.file);
        Versioned {
            value: file.values.get(key).cloned(),
            revision: file.revision(key),
        }
    }

    /// All keys currently present, sorted.
    pub fn keys(&self) -> Vec<String> {
        match &self.paths {
            Some(paths) => load_namespace(&paths.file).values.into_keys().collect(),
            None => Vec::new(),
        }
    }

    /// Writes a value, discarding the write (with a log line) on failure.
    pub fn set(&self, key: &str, value: &str) {
        match self.try_set(key, value) {
            Ok(revision) => debug!(
                app_group = %self.app_group,
                key = %key,
                revision,
                "Shared store value written"
            ),
            Err(SimplistError::StoreUnavailable(_)) => debug!(
                app_group = %self.app_group,
                key = %key,
                "Discarding write to unavailable shared store"
            ),
            Err(err) => warn!(
                error = %err,
                app_group = %self.app_group,
                key = %key,
                "Failed to write shared store value"
            ),
        }
    }

    /// Writes a value unconditionally and returns the key's new revision.
    pub fn try_set(&self, key: &str, value: &str) -> Result<u64> {
        let paths = self.require_paths()?;
        let _lock = FileLock::acquire(&paths.lock)?;
        let mut file = load_namespace(&paths.file);
        let revision = file.put(key, value);
        persist_namespace(&paths.file, &file)?;
        Ok(revision)
    }

    /// Writes a value only if the key is still at `expected_revision`.
    pub fn compare_and_set(&self, key: &str, expected_revision: u64, value: &str) -> Result<u64> {
        let paths = self.require_paths()?;
        let _lock = FileLock::acquire(&paths.lock)?;
        let mut file = load_namespace(&paths.file);
        let actual = file.revision(key);
        if actual != expected_revision {
            return Err(SimplistError::RevisionConflict {
                key: key.to_string(),
                expected: expected_revision,
                actual,
            });
        }
        let revision = file.put(key, value);
        persist_namespace(&paths.file, &file)?;
        Ok(revision)
    }

    /// Forces the namespace file to stable storage.
    ///
    /// Other processes already observe a value once `set` returns; this only
    /// adds durability across power loss.
    pub fn flush(&self) {
        let Some(paths) = &self.paths else {
            return;
        };
        if !paths.file.exists() {
            return;
        }
        let result = fs::File::open(&paths.file).and_then(|file| file.sync_all());
        if let Err(err) = result {
            warn!(error = %err, app_group = %self.app_group, "Failed to flush shared store");
        }
    }

    fn require_paths(&self) -> Result<&StorePaths> {
        self.paths
            .as_ref()
            .ok_or_else(|| SimplistError::StoreUnavailable(self.app_group.clone()))
    }
}

fn load_namespace(path: &Path) -> NamespaceFile {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return NamespaceFile::default();
        }
        Err(err) => {
            warn!(error = %err, "Failed to read shared store; treating as empty");
            return NamespaceFile::default();
        }
    };

    if content.trim().is_empty() {
        return NamespaceFile::default();
    }

    match serde_json::from_str::<NamespaceFile>(&content) {
        Ok(file) if file.version == STORE_VERSION => file,
        Ok(file) => {
            warn!(
                version = file.version,
                expected = STORE_VERSION,
                path = %path.display(),
                "Unsupported shared store version; treating as empty"
            );
            NamespaceFile::default()
        }
        Err(err) => {
            warn!(
                error = %err,
                path = %path.display(),
                "Corrupt shared store file; treating as empty"
            );
            NamespaceFile::default()
        }
    }
}

fn persist_namespace(path: &Path, file: &NamespaceFile) -> Result<()> {
    let content = serde_json::to_string_pretty(file)
        .map_err(|err| SimplistError::json("serialize shared store", err))?;

    let parent_dir = path.parent().ok_or_else(|| {
        SimplistError::io(
            "shared store path has no parent directory",
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        )
    })?;
    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .map_err(|err| SimplistError::io("create temp shared store file", err))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|err| SimplistError::io("write temp shared store file", err))?;
    temp_file
        .flush()
        .map_err(|err| SimplistError::io("flush temp shared store file", err))?;
    temp_file
        .persist(path)
        .map_err(|err| SimplistError::io("replace shared store file", err.error))?;
    Ok(())
}

/// Exclusive advisory lock held for the lifetime of the guard.
struct FileLock {
    #[allow(dead_code)]
    file: std::fs::File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|err| SimplistError::io("open shared store lock", err))?
            .into_parts()
            .0;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            // SAFETY: flock on a descriptor we own; released on close.
            #[allow(unsafe_code)]
            let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
            if rc != 0 {
                return Err(SimplistError::io(
                    "lock shared store",
                    std::io::Error::last_os_error(),
                ));
            }
        }

        Ok(FileLock { file })
    }
}
