//! The plain node tree shared by all store backends.
//!
//! [`NodeTree`] is a `BTreeMap` from path string to [`NodeRecord`]. Keeping
//! the keys as strings means the descendants of `/a` are exactly the keys
//! with prefix `/a/`, which form one contiguous range.

use std::collections::BTreeMap;

use arbor_types::{NodePath, Value, ROOT_NODE_TYPE};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::node::{Node, PropertyMap};

/// Stored state of a single node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Primary type of the node.
    pub node_type: String,
    /// Scalar properties by name.
    #[serde(default)]
    pub properties: PropertyMap,
}

impl NodeRecord {
    /// A record with the given type and no properties.
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            properties: PropertyMap::new(),
        }
    }
}

/// A complete tree of nodes, always containing the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    nodes: BTreeMap<String, NodeRecord>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// A tree holding only the root node.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), NodeRecord::new(ROOT_NODE_TYPE));
        Self { nodes }
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root is never removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check structural invariants of a tree loaded from outside: every key
    /// is a valid path, the root exists, and every node's parent exists.
    pub fn validate(&self) -> StoreResult<()> {
        if !self.nodes.contains_key("/") {
            return Err(StoreError::Corrupt("root node missing".into()));
        }
        for key in self.nodes.keys() {
            let path = NodePath::parse(key)
                .map_err(|e| StoreError::Corrupt(format!("bad key {key:?}: {e}")))?;
            if let Some(parent) = path.parent() {
                if !self.nodes.contains_key(parent.as_str()) {
                    return Err(StoreError::Corrupt(format!("{key} has no parent node")));
                }
            }
        }
        Ok(())
    }

    /// Look up a node record.
    pub fn get(&self, path: &NodePath) -> Option<&NodeRecord> {
        self.nodes.get(path.as_str())
    }

    fn get_mut(&mut self, path: &NodePath) -> StoreResult<&mut NodeRecord> {
        self.nodes
            .get_mut(path.as_str())
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    /// View of the node at `path`, if present.
    pub fn node(&self, path: &NodePath) -> Option<Node> {
        self.get(path)
            .map(|record| Node::new(path.clone(), record.node_type.clone()))
    }

    /// Return the existing node at `path`, or create it with `node_type`.
    ///
    /// Missing ancestors are created with `default_type` when
    /// `create_ancestors` is set; otherwise a missing parent is an error.
    /// The returned flag is `true` when the node itself was created.
    pub fn resolve_or_create(
        &mut self,
        path: &NodePath,
        node_type: &str,
        default_type: &str,
        create_ancestors: bool,
    ) -> StoreResult<(Node, bool)> {
        if let Some(node) = self.node(path) {
            return Ok((node, false));
        }

        for ancestor in path.ancestors() {
            if self.nodes.contains_key(ancestor.as_str()) {
                continue;
            }
            if !create_ancestors {
                return Err(StoreError::ParentNotFound(path.clone()));
            }
            self.nodes
                .insert(ancestor.as_str().to_string(), NodeRecord::new(default_type));
        }

        let effective = if node_type.is_empty() { default_type } else { node_type };
        self.nodes
            .insert(path.as_str().to_string(), NodeRecord::new(effective));
        Ok((Node::new(path.clone(), effective), true))
    }

    /// Change the primary type of an existing node.
    pub fn set_node_type(&mut self, path: &NodePath, node_type: &str) -> StoreResult<()> {
        self.get_mut(path)?.node_type = node_type.to_string();
        Ok(())
    }

    /// All properties of a node.
    pub fn properties(&self, path: &NodePath) -> StoreResult<PropertyMap> {
        self.get(path)
            .map(|record| record.properties.clone())
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    /// Set (or replace) one property.
    pub fn set_property(&mut self, path: &NodePath, name: &str, value: Value) -> StoreResult<()> {
        self.get_mut(path)?.properties.insert(name.to_string(), value);
        Ok(())
    }

    /// Remove one property, returning its previous value.
    pub fn remove_property(&mut self, path: &NodePath, name: &str) -> StoreResult<Option<Value>> {
        Ok(self.get_mut(path)?.properties.remove(name))
    }

    /// Direct children of the node at `path`, ordered by name.
    pub fn children(&self, path: &NodePath) -> StoreResult<Vec<Node>> {
        if !self.nodes.contains_key(path.as_str()) {
            return Err(StoreError::NotFound(path.clone()));
        }
        let depth = path.depth() + 1;
        let children = self
            .descendant_keys(path)
            .filter_map(|key| {
                let child = NodePath::parse(key).ok()?;
                if child.depth() != depth {
                    return None;
                }
                let record = self.nodes.get(key)?;
                Some(Node::new(child, record.node_type.clone()))
            })
            .collect();
        Ok(children)
    }

    /// Delete the node at `path` and its whole subtree.
    ///
    /// Returns `false` if there was no such node.
    pub fn delete(&mut self, path: &NodePath) -> StoreResult<bool> {
        if path.is_root() {
            return Err(StoreError::RootDeletion);
        }
        if self.nodes.remove(path.as_str()).is_none() {
            return Ok(false);
        }
        let doomed: Vec<String> = self.descendant_keys(path).map(str::to_string).collect();
        for key in doomed {
            self.nodes.remove(&key);
        }
        Ok(true)
    }

    fn descendant_keys<'a>(&'a self, path: &NodePath) -> impl Iterator<Item = &'a str> + 'a {
        let prefix = if path.is_root() {
            "/".to_string()
        } else {
            format!("{}/", path.as_str())
        };
        self.nodes
            .range(prefix.clone()..)
            .map(|(key, _)| key.as_str())
            .take_while(move |key| key.starts_with(prefix.as_str()))
            .filter(|key| *key != "/")
    }
}
