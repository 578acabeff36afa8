//! WidgetEngine - the entry point for widget and host clients.
//!
//! Wires one [`WidgetConfig`] into the snapshot provider, the tile actions
//! and the host bridge so every side opens the same app group and key.
//! The engine holds no store handle; each call opens the namespace afresh.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use simplist_core::{SizeClass, WidgetEngine};
//!
//! let engine = WidgetEngine::new()?;
//! let tile = engine.render(SizeClass::Medium);
//! let result = engine.toggle(2, SizeClass::Medium);
//! ```

use chrono::Utc;
use serde::Serialize;

use crate::actions::{Mutation, MutationOutcome, TodoActions};
use crate::bridge::HostBridge;
use crate::config::WidgetConfig;
use crate::error::Result;
use crate::render::{render, TileView};
use crate::snapshot::{Snapshot, SnapshotProvider, Timeline};
use crate::storage::StorageConfig;
use crate::types::{SizeClass, TodoItem};

/// Result of a tile action, with the snapshot the tile should show next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub outcome: MutationOutcome,
    /// Fresh snapshot, present only when the action rewrote the list.
    pub refreshed: Option<Snapshot>,
}

#[derive(Debug, Clone)]
pub struct WidgetEngine {
    storage: StorageConfig,
    config: WidgetConfig,
    provider: SnapshotProvider,
    actions: TodoActions,
}

impl WidgetEngine {
    /// Creates an engine from `SIMPLIST_HOME` / `~/.simplist` and `widget.toml`.
    pub fn new() -> Result<Self> {
        let storage = StorageConfig::from_env()?;
        let config = WidgetConfig::resolve(&storage);
        Ok(Self::with_storage(storage, config))
    }

    /// Creates an engine with explicit storage and configuration.
    /// Used by tests and by the host daemon, which resolves both itself.
    pub fn with_storage(storage: StorageConfig, config: WidgetConfig) -> Self {
        let provider = SnapshotProvider::new(storage.clone(), config.clone());
        let actions = TodoActions::new(storage.clone(), &config);
        WidgetEngine {
            storage,
            config,
            provider,
            actions,
        }
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Bridge bound to the same app group the widget reads.
    pub fn host_bridge(&self) -> HostBridge {
        HostBridge::new(self.storage.clone(), &self.config)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Read Path
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn todos(&self) -> Vec<TodoItem> {
        self.provider.load_todos()
    }

    pub fn snapshot(&self, size: SizeClass) -> Snapshot {
        self.provider.refresh(size)
    }

    pub fn placeholder(&self) -> Snapshot {
        self.provider.placeholder()
    }

    pub fn timeline(&self, size: SizeClass) -> Timeline {
        self.provider.timeline(size, Utc::now())
    }

    pub fn render(&self, size: SizeClass) -> TileView {
        render(size, &self.snapshot(size), self.config.interactive)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Tile Actions
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn toggle(&self, index: usize, size: SizeClass) -> ActionResult {
        self.perform(Mutation::Toggle(index), size)
    }

    pub fn delete(&self, index: usize, size: SizeClass) -> ActionResult {
        self.perform(Mutation::Delete(index), size)
    }

    /// Applies a mutation and, if it landed, re-runs the read path right away
    /// instead of waiting for the next scheduled refresh.
    pub fn perform(&self, mutation: Mutation, size: SizeClass) -> ActionResult {
        let outcome = self.actions.apply(mutation);
        let refreshed = outcome.is_applied().then(|| self.provider.refresh(size));
        ActionResult { outcome, refreshed }
    }
}
