use std::collections::BTreeMap;

use arbor_types::{NodePath, Value};

/// Named scalar properties of a node.
pub type PropertyMap = BTreeMap<String, Value>;

/// A read-only view of a node: its path and its type at the time of the
/// call. Properties and children are queried through the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Absolute path of the node.
    pub path: NodePath,
    /// The node's primary type.
    pub node_type: String,
}

impl Node {
    /// Create a node view.
    pub fn new(path: NodePath, node_type: impl Into<String>) -> Self {
        Self {
            path,
            node_type: node_type.into(),
        }
    }

    /// The node's own name (last path segment), or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.path.name()
    }
}
