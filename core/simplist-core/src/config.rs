//! Widget configuration loading.
//!
//! Host and widget must agree on the app group and the todo key, so both
//! resolve them from the same [`WidgetConfig`]:
//!
//! 1. `widget.toml` under the storage root (missing file → defaults)
//! 2. Environment overrides (`SIMPLIST_APP_GROUP`, `SIMPLIST_TODOS_KEY`)
//!
//! ```toml
//! app_group = "group.com.simplist.app"
//! todos_key = "todos"
//! interactive = true
//!
//! [refresh]
//! interval_secs = 300
//! policy = "after"
//!
//! [consistency]
//! mode = "last_write_wins"
//! max_retries = 3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actions::ConsistencyMode;
use crate::error::{Result, SimplistError};
use crate::storage::StorageConfig;

pub const DEFAULT_APP_GROUP: &str = "group.com.simplist.app";
pub const DEFAULT_TODOS_KEY: &str = "todos";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_MAX_RETRIES: u32 = 3;

pub const APP_GROUP_ENV: &str = "SIMPLIST_APP_GROUP";
pub const TODOS_KEY_ENV: &str = "SIMPLIST_TODOS_KEY";

/// Key names older builds wrote the todo list under.
pub const LEGACY_TODOS_KEYS: [&str; 2] = ["HomeWidget.todos", "todos"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Shared namespace identifier both processes open.
    pub app_group: String,
    /// Key holding the encoded todo list.
    pub todos_key: String,
    /// Whether the platform supports in-tile toggle/delete buttons.
    pub interactive: bool,
    pub refresh: RefreshConfig,
    pub consistency: ConsistencyConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        WidgetConfig {
            app_group: DEFAULT_APP_GROUP.to_string(),
            todos_key: DEFAULT_TODOS_KEY.to_string(),
            interactive: true,
            refresh: RefreshConfig::default(),
            consistency: ConsistencyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
    pub policy: RefreshPolicyKind,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            policy: RefreshPolicyKind::After,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicyKind {
    /// Ask for another refresh once the interval has elapsed.
    #[default]
    After,
    /// Render once and wait for an explicit reload.
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    pub mode: ConsistencyModeKind,
    pub max_retries: u32,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        ConsistencyConfig {
            mode: ConsistencyModeKind::LastWriteWins,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyModeKind {
    #[default]
    LastWriteWins,
    Optimistic,
}

impl ConsistencyConfig {
    pub fn mode(&self) -> ConsistencyMode {
        match self.mode {
            ConsistencyModeKind::LastWriteWins => ConsistencyMode::LastWriteWins,
            ConsistencyModeKind::Optimistic => ConsistencyMode::Optimistic {
                max_retries: self.max_retries,
            },
        }
    }
}

impl WidgetConfig {
    /// Loads a config file, returning defaults if it doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(WidgetConfig::default());
        }

        let content = fs_err::read_to_string(path)
            .map_err(|err| SimplistError::io("read widget config", err))?;
        toml::from_str::<WidgetConfig>(&content).map_err(|err| SimplistError::ConfigMalformed {
            path: path.to_path_buf(),
            details: err.to_string(),
        })
    }

    /// Loads `widget.toml` from the storage root and applies environment
    /// overrides. A malformed file is logged and replaced by defaults.
    pub fn resolve(storage: &StorageConfig) -> Self {
        let config = WidgetConfig::load(&storage.config_file()).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to load widget config; using defaults");
            WidgetConfig::default()
        });
        config.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production). Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(app_group) = non_empty(APP_GROUP_ENV) {
            self.app_group = app_group;
        }
        if let Some(todos_key) = non_empty(TODOS_KEY_ENV) {
            self.todos_key = todos_key;
        }
        self
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        let secs = i64::try_from(self.refresh.interval_secs).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let config = WidgetConfig::load(&temp_dir.path().join("missing.toml")).expect("load");
        assert_eq!(config, WidgetConfig::default());
        assert_eq!(config.app_group, "group.com.simplist.app");
        assert_eq!(config.todos_key, "todos");
        assert_eq!(config.refresh.interval_secs, 300);
        assert_eq!(config.consistency.mode(), ConsistencyMode::LastWriteWins);
    }

    #[test]
    fn parses_full_file() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("widget.toml");
        fs_err::write(
            &path,
            r#"
app_group = "group.example.todo"
todos_key = "HomeWidget.todos"
interactive = false

[refresh]
interval_secs = 60
policy = "never"

[consistency]
mode = "optimistic"
max_retries = 5
"#,
        )
        .expect("write config");

        let config = WidgetConfig::load(&path).expect("load config");
        assert_eq!(config.app_group, "group.example.todo");
        assert_eq!(config.todos_key, "HomeWidget.todos");
        assert!(!config.interactive);
        assert_eq!(config.refresh.interval_secs, 60);
        assert_eq!(config.refresh.policy, RefreshPolicyKind::Never);
        assert_eq!(
            config.consistency.mode(),
            ConsistencyMode::Optimistic { max_retries: 5 }
        );
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("widget.toml");
        fs_err::write(&path, "todos_key = \"items\"\n").expect("write config");

        let config = WidgetConfig::load(&path).expect("load config");
        assert_eq!(config.todos_key, "items");
        assert_eq!(config.app_group, DEFAULT_APP_GROUP);
        assert_eq!(config.refresh, RefreshConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("widget.toml");
        fs_err::write(&path, "app_group = [").expect("write config");

        let err = WidgetConfig::load(&path).unwrap_err();
        assert!(matches!(err, SimplistError::ConfigMalformed { .. }));
    }

    #[test]
    fn resolve_falls_back_to_defaults_on_malformed_file() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let storage = StorageConfig::with_root(temp_dir.path().to_path_buf());
        fs_err::write(storage.config_file(), "not = [valid").expect("write config");

        let config = WidgetConfig::resolve(&storage);
        assert_eq!(config.refresh, RefreshConfig::default());
        assert_eq!(config.consistency, ConsistencyConfig::default());
        assert!(config.interactive);
    }

    #[test]
    fn environment_overrides_namespace_and_key() {
        let config = WidgetConfig::default().with_overrides(|name| match name {
            APP_GROUP_ENV => Some("group.override".to_string()),
            TODOS_KEY_ENV => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.app_group, "group.override");
        assert_eq!(config.todos_key, DEFAULT_TODOS_KEY);
    }

    #[test]
    fn refresh_interval_converts_seconds() {
        let config = WidgetConfig::default();
        assert_eq!(config.refresh_interval(), chrono::Duration::minutes(5));
    }
}
