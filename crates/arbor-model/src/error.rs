//! Error types for the object model.

use thiserror::Error;

/// Failure reading a field or accessor of a live object.
///
/// The engine never propagates these: they are logged and the value is
/// treated as unavailable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("no such field: {0}")]
    NoSuchField(String),

    #[error("no such accessor: {0}")]
    NoSuchAccessor(String),

    #[error("reading {name} failed: {reason}")]
    Failed { name: String, reason: String },
}

/// Errors from building model objects.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The document is not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document root must be a JSON object or array.
    #[error("unsupported document root: expected object or array, got {0}")]
    UnsupportedRoot(&'static str),

    /// An array mixes objects and scalars, or scalars of different kinds.
    #[error("field {field}: arrays must hold only objects or only scalars of one kind")]
    MixedArray { field: String },

    /// A nested array cannot be represented.
    #[error("field {field}: nested arrays are not supported")]
    NestedArray { field: String },

    /// A `@`-directive has the wrong JSON type.
    #[error("directive {directive}: {reason}")]
    InvalidDirective { directive: String, reason: String },
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;
