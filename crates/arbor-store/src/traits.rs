use arbor_types::{NodePath, Value};

use crate::error::StoreResult;
use crate::node::{Node, PropertyMap};

/// Hierarchical node store with a single pending transaction.
///
/// All implementations must satisfy these invariants:
/// - Reads observe staged (uncommitted) changes.
/// - `commit` publishes all staged changes atomically; on failure nothing
///   is published and the staged changes remain pending.
/// - `delete` removes the whole subtree below the node.
/// - The root node `/` always exists.
///
/// A store handle is used by one synchronization call at a time; callers
/// sharing a handle across threads must serialize their transactions.
pub trait NodeStore: Send + Sync {
    /// Look up the node at `path`.
    ///
    /// Returns `Ok(None)` if there is no such node.
    fn node(&self, path: &NodePath) -> StoreResult<Option<Node>>;

    /// Return the node at `path`, creating it with `node_type` if missing.
    ///
    /// An existing node is returned unchanged (its type is not touched).
    /// Missing ancestors are created with `default_type` when
    /// `create_ancestors` is set; otherwise a missing parent is an error.
    fn resolve_or_create(
        &self,
        path: &NodePath,
        node_type: &str,
        default_type: &str,
        create_ancestors: bool,
    ) -> StoreResult<Node>;

    /// Change the primary type of an existing node.
    fn set_node_type(&self, path: &NodePath, node_type: &str) -> StoreResult<()>;

    /// All properties of the node at `path`.
    fn properties(&self, path: &NodePath) -> StoreResult<PropertyMap>;

    /// Set (or replace) a property.
    fn set_property(&self, path: &NodePath, name: &str, value: Value) -> StoreResult<()>;

    /// Remove a property, returning its previous value if it had one.
    fn remove_property(&self, path: &NodePath, name: &str) -> StoreResult<Option<Value>>;

    /// Direct children of the node at `path`.
    fn children(&self, path: &NodePath) -> StoreResult<Vec<Node>>;

    /// Delete the node at `path` with its subtree.
    ///
    /// Returns `Ok(true)` if the node existed, `Ok(false)` if it did not.
    fn delete(&self, path: &NodePath) -> StoreResult<bool>;

    /// Publish every staged change.
    fn commit(&self) -> StoreResult<()>;

    /// Drop every staged change, reverting to the last committed state.
    fn discard(&self) -> StoreResult<()>;

    /// Returns `true` if there are staged changes not yet committed.
    fn has_pending_changes(&self) -> StoreResult<bool>;

    /// Look up one property.
    fn property(&self, path: &NodePath, name: &str) -> StoreResult<Option<Value>> {
        Ok(self.properties(path)?.remove(name))
    }

    /// Look up one property as a string. Non-string values yield `None`.
    fn string_property(&self, path: &NodePath, name: &str) -> StoreResult<Option<String>> {
        Ok(match self.property(path, name)? {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }

    /// Look up a named direct child of the node at `path`.
    fn child(&self, path: &NodePath, name: &str) -> StoreResult<Option<Node>> {
        self.node(&path.join(name)?)
    }

    /// Returns `true` if a node exists at `path`.
    fn exists(&self, path: &NodePath) -> StoreResult<bool> {
        Ok(self.node(path)?.is_some())
    }
}
