//! Object-graph synchronization for Arbor.
//!
//! A [`Synchronizer`] writes an object graph into a [`NodeStore`] and
//! reconciles the store so it mirrors the graph: missing nodes are created,
//! properties updated, and children that no longer correspond to anything
//! in the graph deleted.
//!
//! # Design Rules
//!
//! - Arguments are validated before anything is written.
//! - All writes of one top-level call share the store's transaction, which
//!   is committed once when the call succeeds and never when it fails.
//! - Store failures while writing abort the call; failures while deleting
//!   orphans are logged, counted, and skipped.
//! - Unreadable fields are logged and treated as unavailable.
//!
//! [`NodeStore`]: arbor_store::NodeStore

pub mod config;
pub mod error;
pub mod orphans;
mod reconciler;
pub mod report;
pub mod synchronizer;
pub mod transaction;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use orphans::{delete_container, delete_orphans, Pruned};
pub use report::SyncReport;
pub use synchronizer::Synchronizer;
pub use transaction::Transaction;
