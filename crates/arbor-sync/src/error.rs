use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Rejected before anything was written.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid node name or path: {0}")]
    Type(#[from] arbor_types::TypeError),

    #[error("store error: {0}")]
    Store(#[from] arbor_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
