use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The path is not a well-formed absolute node path.
    #[error("invalid node path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A single path segment (node name) is not usable.
    #[error("invalid node name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A multi-value property contained a nested array.
    #[error("nested arrays are not valid property values")]
    NestedArray,
}
