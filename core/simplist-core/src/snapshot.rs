//! Read path: turns the stored todo list into render-ready snapshots.
//!
//! The provider opens a fresh store handle on every call, decodes the list
//! tolerantly and truncates it to the tile's capacity. It never fails; a
//! missing store, a missing key and garbage all produce an empty snapshot,
//! which renders as the "No todos yet" placeholder.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::codec;
use crate::config::{RefreshPolicyKind, WidgetConfig};
use crate::shared_store::SharedStore;
use crate::storage::StorageConfig;
use crate::types::{SizeClass, TodoItem};

/// What a tile shows at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    /// First `capacity` items of the stored list, in stored order.
    pub items: Vec<TodoItem>,
    /// Number of items in the stored list before truncation.
    pub total: usize,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items stored but not shown because the tile is full.
    pub fn hidden_count(&self) -> usize {
        self.total.saturating_sub(self.items.len())
    }

    fn from_items(timestamp: DateTime<Utc>, mut items: Vec<TodoItem>, capacity: usize) -> Self {
        let total = items.len();
        items.truncate(capacity);
        Snapshot {
            timestamp,
            items,
            total,
        }
    }
}

/// When the platform should ask for the next snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum RefreshPolicy {
    After(DateTime<Utc>),
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub entries: Vec<Snapshot>,
    pub policy: RefreshPolicy,
}

#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    storage: StorageConfig,
    config: WidgetConfig,
}

impl SnapshotProvider {
    pub fn new(storage: StorageConfig, config: WidgetConfig) -> Self {
        SnapshotProvider { storage, config }
    }

    /// Reads and decodes the whole stored list.
    pub fn load_todos(&self) -> Vec<TodoItem> {
        let store = SharedStore::open(&self.storage, &self.config.app_group);
        let raw = store.get(&self.config.todos_key);
        let items = codec::decode(raw.as_deref());
        tracing::debug!(
            app_group = %self.config.app_group,
            key = %self.config.todos_key,
            present = raw.is_some(),
            items = items.len(),
            "Loaded todos from shared store"
        );
        items
    }

    pub fn refresh(&self, size: SizeClass) -> Snapshot {
        self.refresh_at(size, Utc::now())
    }

    pub fn refresh_at(&self, size: SizeClass, now: DateTime<Utc>) -> Snapshot {
        Snapshot::from_items(now, self.load_todos(), size.capacity())
    }

    /// Fixed sample shown in widget galleries before any data exists.
    pub fn placeholder(&self) -> Snapshot {
        Snapshot::from_items(
            Utc::now(),
            vec![
                TodoItem::new("Sample Todo 1", false),
                TodoItem::new("Sample Todo 2", true),
            ],
            usize::MAX,
        )
    }

    /// One-entry timeline with the configured reload policy.
    pub fn timeline(&self, size: SizeClass, now: DateTime<Utc>) -> Timeline {
        let entry = self.refresh_at(size, now);
        let policy = match self.config.refresh.policy {
            RefreshPolicyKind::After => now
                .checked_add_signed(self.config.refresh_interval())
                .map_or(RefreshPolicy::Never, RefreshPolicy::After),
            RefreshPolicyKind::Never => RefreshPolicy::Never,
        };
        Timeline {
            entries: vec![entry],
            policy,
        }
    }
}
