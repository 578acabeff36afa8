//! Toggle and delete actions triggered from the tile.
//!
//! Both actions rewrite the whole stored list: read, decode, change one
//! position, encode, write, flush. Nothing here reports an error to the tile;
//! every failure becomes a [`MutationOutcome`] that the caller may log and
//! otherwise ignores.
//!
//! # Consistency
//!
//! In [`ConsistencyMode::LastWriteWins`] the write is unconditional, so two
//! overlapping read-modify-write cycles (host and widget, or two quick taps)
//! lose the earlier write. [`ConsistencyMode::Optimistic`] writes with
//! [`SharedStore::compare_and_set`] and, on conflict, re-reads and re-applies
//! the same positional mutation to the fresh list.
//!
//! Positional addressing is inherent: if the list moved underneath a retry,
//! the index now names whatever item sits there.

use serde::Serialize;
use tracing::{info, warn};

use crate::codec;
use crate::config::WidgetConfig;
use crate::error::SimplistError;
use crate::shared_store::SharedStore;
use crate::storage::StorageConfig;
use crate::types::TodoItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsistencyMode {
    #[default]
    LastWriteWins,
    Optimistic {
        max_retries: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Mutation {
    Toggle(usize),
    Delete(usize),
}

impl Mutation {
    pub fn index(self) -> usize {
        match self {
            Mutation::Toggle(index) | Mutation::Delete(index) => index,
        }
    }

    /// Applies the mutation in place. Returns false when the index is out of range.
    pub fn apply(self, items: &mut Vec<TodoItem>) -> bool {
        let index = self.index();
        if index >= items.len() {
            return false;
        }
        match self {
            Mutation::Toggle(_) => items[index].is_done = !items[index].is_done,
            Mutation::Delete(_) => {
                items.remove(index);
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    /// The list was rewritten.
    Applied,
    /// The index did not address an item; nothing was written.
    OutOfRange,
    /// The store could not be opened or written; nothing was written.
    StoreUnavailable,
    /// Optimistic mode only: the key kept moving and retries ran out.
    Conflict,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == MutationOutcome::Applied
    }
}

/// A mutated list waiting to be written, plus the revision it was based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub mutation: Mutation,
    pub items: Vec<TodoItem>,
    pub base_revision: u64,
}

#[derive(Debug, Clone)]
pub struct TodoActions {
    storage: StorageConfig,
    app_group: String,
    todos_key: String,
    mode: ConsistencyMode,
}

impl TodoActions {
    pub fn new(storage: StorageConfig, config: &WidgetConfig) -> Self {
        TodoActions {
            storage,
            app_group: config.app_group.clone(),
            todos_key: config.todos_key.clone(),
            mode: config.consistency.mode(),
        }
    }

    pub fn with_mode(mut self, mode: ConsistencyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ConsistencyMode {
        self.mode
    }

    pub fn toggle(&self, index: usize) -> MutationOutcome {
        self.apply(Mutation::Toggle(index))
    }

    pub fn delete(&self, index: usize) -> MutationOutcome {
        self.apply(Mutation::Delete(index))
    }

    /// Runs one full read-modify-write cycle for `mutation`.
    pub fn apply(&self, mutation: Mutation) -> MutationOutcome {
        self.apply_interleaved(mutation, |_| {})
    }

    /// Like [`apply`](Self::apply), calling `between` after each read and
    /// before the matching write. Tests use it to land concurrent writes.
    fn apply_interleaved<F>(&self, mutation: Mutation, mut between: F) -> MutationOutcome
    where
        F: FnMut(&PendingWrite),
    {
        let retries = match self.mode {
            ConsistencyMode::LastWriteWins => 0,
            ConsistencyMode::Optimistic { max_retries } => max_retries,
        };

        let mut attempt = 0;
        loop {
            let pending = match self.prepare(mutation) {
                Ok(pending) => pending,
                Err(outcome) => return outcome,
            };
            between(&pending);
            match self.commit(pending) {
                MutationOutcome::Conflict if attempt < retries => {
                    attempt += 1;
                    tracing::debug!(attempt, ?mutation, "Retrying mutation after conflict");
                }
                outcome => return outcome,
            }
        }
    }

    /// Read half of the cycle: decodes the full list and applies the mutation
    /// in memory.
    pub fn prepare(&self, mutation: Mutation) -> Result<PendingWrite, MutationOutcome> {
        let store = self.open_store();
        if !store.is_available() {
            return Err(MutationOutcome::StoreUnavailable);
        }

        let current = store.get_versioned(&self.todos_key);
        let mut items = codec::decode(current.value.as_deref());
        if !mutation.apply(&mut items) {
            tracing::debug!(?mutation, len = items.len(), "Mutation index out of range");
            return Err(MutationOutcome::OutOfRange);
        }

        Ok(PendingWrite {
            mutation,
            items,
            base_revision: current.revision,
        })
    }

    /// Write half of the cycle.
    pub fn commit(&self, pending: PendingWrite) -> MutationOutcome {
        let store = self.open_store();
        let encoded = match codec::encode(&pending.items) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "Failed to encode todo list");
                return MutationOutcome::StoreUnavailable;
            }
        };

        let written = match self.mode {
            ConsistencyMode::LastWriteWins => store.try_set(&self.todos_key, &encoded),
            ConsistencyMode::Optimistic { .. } => {
                store.compare_and_set(&self.todos_key, pending.base_revision, &encoded)
            }
        };

        match written {
            Ok(revision) => {
                store.flush();
                info!(
                    mutation = ?pending.mutation,
                    items = pending.items.len(),
                    revision,
                    "Todo list updated"
                );
                MutationOutcome::Applied
            }
            Err(SimplistError::RevisionConflict {
                expected, actual, ..
            }) => {
                warn!(
                    mutation = ?pending.mutation,
                    expected,
                    actual,
                    "Todo list changed since it was read"
                );
                MutationOutcome::Conflict
            }
            Err(err) => {
                warn!(error = %err, mutation = ?pending.mutation, "Failed to write todo list");
                MutationOutcome::StoreUnavailable
            }
        }
    }

    fn open_store(&self) -> SharedStore {
        SharedStore::open(&self.storage, &self.app_group)
    }
}
