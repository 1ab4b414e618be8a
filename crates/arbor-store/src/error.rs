use arbor_types::{NodePath, TypeError};

/// Errors from node store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed node does not exist.
    #[error("node not found: {0}")]
    NotFound(NodePath),

    /// A node cannot be created because its parent is missing and ancestor
    /// creation was not requested.
    #[error("parent of {0} does not exist")]
    ParentNotFound(NodePath),

    /// The root node cannot be deleted.
    #[error("the root node cannot be deleted")]
    RootDeletion,

    /// A path or node name failed validation.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] TypeError),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted snapshot does not describe a well-formed tree.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    /// A lock guarding the store state was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// The backend refused the operation.
    #[error("store is read-only")]
    ReadOnly,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
