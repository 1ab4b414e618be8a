//! Hierarchical node storage for Arbor.
//!
//! The store holds a tree of typed nodes addressed by absolute paths. Each
//! node carries a type name, a bag of named scalar properties, and a set of
//! uniquely named children. All mutations are staged in a single pending
//! transaction that becomes durable on [`NodeStore::commit`].
//!
//! # Storage Backends
//!
//! All backends implement the [`NodeStore`] trait:
//!
//! - [`InMemoryNodeStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FileNodeStore`] -- in-memory staging with a JSON snapshot on disk
//!
//! # Design Rules
//!
//! 1. Reads observe the pending transaction (a writer sees its own changes).
//! 2. `commit` publishes every staged change at once; `discard` drops them.
//! 3. Deleting a node deletes its whole subtree.
//! 4. The root node always exists and cannot be deleted.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod dump;
pub mod error;
pub mod file;
pub mod memory;
pub mod node;
pub mod traits;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use dump::render_tree;
pub use error::{StoreError, StoreResult};
pub use file::FileNodeStore;
pub use memory::InMemoryNodeStore;
pub use node::{Node, PropertyMap};
pub use traits::NodeStore;
pub use tree::{NodeRecord, NodeTree};
