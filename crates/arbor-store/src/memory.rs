use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use arbor_types::{NodePath, Value};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::node::{Node, PropertyMap};
use crate::traits::NodeStore;
use crate::tree::NodeTree;

/// Committed and staged trees plus bookkeeping.
#[derive(Debug, Default)]
struct TxState {
    committed: NodeTree,
    staged: NodeTree,
    dirty: bool,
    commits: u64,
}

/// In-memory node store with a staged transaction.
///
/// Intended for tests and embedding. Mutations go to a staged copy of the
/// tree; `commit` promotes the staged copy to the committed one and
/// `discard` throws it away. Everything sits behind a `RwLock`.
pub struct InMemoryNodeStore {
    state: RwLock<TxState>,
}

impl InMemoryNodeStore {
    /// Create a store holding only the root node.
    pub fn new() -> Self {
        Self::from_tree(NodeTree::new())
    }

    /// Create a store whose committed state is `tree`.
    pub fn from_tree(tree: NodeTree) -> Self {
        Self {
            state: RwLock::new(TxState {
                committed: tree.clone(),
                staged: tree,
                dirty: false,
                commits: 0,
            }),
        }
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, TxState>> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, TxState>> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Copy of the last committed tree.
    pub fn committed_tree(&self) -> StoreResult<NodeTree> {
        Ok(self.read_state()?.committed.clone())
    }

    /// Copy of the staged tree (what readers currently observe).
    pub fn staged_tree(&self) -> StoreResult<NodeTree> {
        Ok(self.read_state()?.staged.clone())
    }

    /// Number of successful commits since the store was created.
    pub fn commit_count(&self) -> StoreResult<u64> {
        Ok(self.read_state()?.commits)
    }

    /// Number of nodes in the staged tree, including the root.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_state()?.staged.len())
    }

    /// Commit, running `publish` on the staged tree first.
    ///
    /// The staged tree is promoted only if `publish` succeeds, which lets a
    /// durable backend write its snapshot before the in-memory state moves.
    pub(crate) fn commit_with<F>(&self, publish: F) -> StoreResult<()>
    where
        F: FnOnce(&NodeTree) -> StoreResult<()>,
    {
        let mut state = self.write_state()?;
        publish(&state.staged)?;
        state.committed = state.staged.clone();
        state.dirty = false;
        state.commits += 1;
        debug!(nodes = state.committed.len(), commits = state.commits, "transaction committed");
        Ok(())
    }

    fn mutate<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&mut NodeTree) -> StoreResult<T>,
    {
        let mut state = self.write_state()?;
        let out = op(&mut state.staged)?;
        state.dirty = true;
        Ok(out)
    }
}

impl Default for InMemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore for InMemoryNodeStore {
    fn node(&self, path: &NodePath) -> StoreResult<Option<Node>> {
        Ok(self.read_state()?.staged.node(path))
    }

    fn resolve_or_create(
        &self,
        path: &NodePath,
        node_type: &str,
        default_type: &str,
        create_ancestors: bool,
    ) -> StoreResult<Node> {
        if let Some(node) = self.node(path)? {
            return Ok(node);
        }
        let (node, _) = self.mutate(|tree| {
            tree.resolve_or_create(path, node_type, default_type, create_ancestors)
        })?;
        debug!(path = %node.path, node_type = %node.node_type, "node created");
        Ok(node)
    }

    fn set_node_type(&self, path: &NodePath, node_type: &str) -> StoreResult<()> {
        self.mutate(|tree| tree.set_node_type(path, node_type))
    }

    fn properties(&self, path: &NodePath) -> StoreResult<PropertyMap> {
        self.read_state()?.staged.properties(path)
    }

    fn set_property(&self, path: &NodePath, name: &str, value: Value) -> StoreResult<()> {
        self.mutate(|tree| tree.set_property(path, name, value))
    }

    fn remove_property(&self, path: &NodePath, name: &str) -> StoreResult<Option<Value>> {
        self.mutate(|tree| tree.remove_property(path, name))
    }

    fn children(&self, path: &NodePath) -> StoreResult<Vec<Node>> {
        self.read_state()?.staged.children(path)
    }

    fn delete(&self, path: &NodePath) -> StoreResult<bool> {
        self.mutate(|tree| tree.delete(path))
    }

    fn commit(&self) -> StoreResult<()> {
        self.commit_with(|_| Ok(()))
    }

    fn discard(&self) -> StoreResult<()> {
        let mut state = self.write_state()?;
        state.staged = state.committed.clone();
        state.dirty = false;
        debug!("staged changes discarded");
        Ok(())
    }

    fn has_pending_changes(&self) -> StoreResult<bool> {
        Ok(self.read_state()?.dirty)
    }
}

impl std::fmt::Debug for InMemoryNodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("InMemoryNodeStore");
        match self.state.read() {
            Ok(state) => s
                .field("node_count", &state.staged.len())
                .field("pending", &state.dirty)
                .finish(),
            Err(_) => s.field("poisoned", &true).finish(),
        }
    }
}
