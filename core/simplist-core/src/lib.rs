//! # simplist-core
//!
//! Core library for the SimpList home-screen widget and its host bridge.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Every store call completes
//!   before returning.
//! - **Graceful degradation**: Missing or malformed data reads as an empty list,
//!   never as an error. Only the host bridge reports failures to its caller.
//! - **One namespace, one key**: Host and widget resolve the app group and the
//!   todo key from the same [`WidgetConfig`], never from literals.
//! - **Last write wins**: Mutations are whole-value read-modify-write cycles.
//!   [`ConsistencyMode::Optimistic`] opts into revision checks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use simplist_core::{SizeClass, WidgetEngine};
//!
//! let engine = WidgetEngine::new()?;
//! let snapshot = engine.snapshot(SizeClass::Small);
//! engine.toggle(0, SizeClass::Small);
//! ```

pub mod actions;
pub mod bridge;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod render;
pub mod shared_store;
pub mod snapshot;
pub mod storage;
pub mod types;

pub use actions::{ConsistencyMode, Mutation, MutationOutcome, PendingWrite, TodoActions};
pub use bridge::{BridgeReply, HostBridge, MethodCall};
pub use codec::{decode, encode};
pub use config::*;
pub use engine::{ActionResult, WidgetEngine};
pub use error::{Result, SimplistError};
pub use render::{render, TileAction, TileRow, TileView, EMPTY_STATE_MESSAGE, EMPTY_TODO_LABEL};
pub use shared_store::{validate_namespace, SharedStore, Versioned};
pub use snapshot::{RefreshPolicy, Snapshot, SnapshotProvider, Timeline};
pub use storage::StorageConfig;
pub use types::*;
