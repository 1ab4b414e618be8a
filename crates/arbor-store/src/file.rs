//! Durable node store backed by a JSON snapshot file.
//!
//! [`FileNodeStore`] stages changes in memory exactly like
//! [`InMemoryNodeStore`]. `commit` serializes the staged tree into a
//! temporary file next to the snapshot and renames it over the snapshot, so
//! a crash leaves either the old or the new snapshot on disk, never a mix.
//! A store opened with [`FileNodeStore::open_read_only`] refuses every
//! mutation with [`StoreError::ReadOnly`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use arbor_types::{NodePath, Value};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryNodeStore;
use crate::node::{Node, PropertyMap};
use crate::traits::NodeStore;
use crate::tree::NodeTree;

/// Node store persisted as a single JSON snapshot.
#[derive(Debug)]
pub struct FileNodeStore {
    path: PathBuf,
    inner: InMemoryNodeStore,
    read_only: bool,
}

impl FileNodeStore {
    /// Open the snapshot at `path`, or start an empty tree if the file does
    /// not exist yet. Nothing is written until the first commit.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = InMemoryNodeStore::from_tree(Self::load(&path)?);
        Ok(Self {
            path,
            inner,
            read_only: false,
        })
    }

    /// Open an existing snapshot for reading only.
    pub fn open_read_only(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no snapshot at {}", path.display()),
            )));
        }
        let inner = InMemoryNodeStore::from_tree(Self::load(&path)?);
        Ok(Self {
            path,
            inner,
            read_only: true,
        })
    }

    /// Location of the snapshot file.
    pub fn snapshot_path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> StoreResult<NodeTree> {
        let tree = if path.exists() {
            let data = fs::read(path)?;
            let tree: NodeTree = serde_json::from_slice(&data)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            tree.validate()?;
            info!(path = %path.display(), nodes = tree.len(), "snapshot loaded");
            tree
        } else {
            debug!(path = %path.display(), "no snapshot yet; starting empty");
            NodeTree::new()
        };
        Ok(tree)
    }

    fn writable(&self) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }

    /// Copy of the staged tree.
    pub fn staged_tree(&self) -> StoreResult<NodeTree> {
        self.inner.staged_tree()
    }

    fn write_snapshot(path: &Path, tree: &NodeTree) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(tree)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        debug!(path = %path.display(), bytes = data.len(), "snapshot written");
        Ok(())
    }
}

impl NodeStore for FileNodeStore {
    fn node(&self, path: &NodePath) -> StoreResult<Option<Node>> {
        self.inner.node(path)
    }

    fn resolve_or_create(
        &self,
        path: &NodePath,
        node_type: &str,
        default_type: &str,
        create_ancestors: bool,
    ) -> StoreResult<Node> {
        if !self.read_only {
            return self
                .inner
                .resolve_or_create(path, node_type, default_type, create_ancestors);
        }
        match self.inner.node(path)? {
            Some(node) => Ok(node),
            None => Err(StoreError::ReadOnly),
        }
    }

    fn set_node_type(&self, path: &NodePath, node_type: &str) -> StoreResult<()> {
        self.writable()?;
        self.inner.set_node_type(path, node_type)
    }

    fn properties(&self, path: &NodePath) -> StoreResult<PropertyMap> {
        self.inner.properties(path)
    }

    fn set_property(&self, path: &NodePath, name: &str, value: Value) -> StoreResult<()> {
        self.writable()?;
        self.inner.set_property(path, name, value)
    }

    fn remove_property(&self, path: &NodePath, name: &str) -> StoreResult<Option<Value>> {
        self.writable()?;
        self.inner.remove_property(path, name)
    }

    fn children(&self, path: &NodePath) -> StoreResult<Vec<Node>> {
        self.inner.children(path)
    }

    fn delete(&self, path: &NodePath) -> StoreResult<bool> {
        self.writable()?;
        self.inner.delete(path)
    }

    fn commit(&self) -> StoreResult<()> {
        self.writable()?;
        let target = self.path.clone();
        self.inner
            .commit_with(|tree| Self::write_snapshot(&target, tree))
    }

    fn discard(&self) -> StoreResult<()> {
        self.inner.discard()
    }

    fn has_pending_changes(&self) -> StoreResult<bool> {
        self.inner.has_pending_changes()
    }
}
