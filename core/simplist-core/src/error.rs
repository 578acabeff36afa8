//! Error types for simplist-core operations.
//!
//! Most of the widget path is fail-soft and never returns these to a user
//! surface; they exist so the plumbing underneath can use `?` and the
//! fail-soft layers can log a precise reason before degrading.

use std::path::PathBuf;

/// All errors that can occur in simplist-core operations.
#[derive(Debug, thiserror::Error)]
pub enum SimplistError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Shared Store Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Invalid app group identifier: {0:?}")]
    InvalidNamespace(String),

    #[error("Shared store unavailable for app group {0}")]
    StoreUnavailable(String),

    #[error("Revision conflict on key {key}: expected {expected}, found {actual}")]
    RevisionConflict {
        key: String,
        expected: u64,
        actual: u64,
    },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using SimplistError.
pub type Result<T> = std::result::Result<T, SimplistError>;

impl SimplistError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SimplistError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        SimplistError::Json {
            context: context.into(),
            source,
        }
    }
}
