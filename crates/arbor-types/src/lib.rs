//! Foundation types for Arbor.
//!
//! This crate provides the structural types shared by the node store and the
//! synchronization engine. Every other Arbor crate depends on `arbor-types`.
//!
//! # Key Types
//!
//! - [`NodePath`] — Validated, absolute, slash-delimited node path
//! - [`Value`] — Scalar property value (or an array of scalars)
//! - [`node_type`] — Well-known node type and node name constants

pub mod error;
pub mod node_type;
pub mod path;
pub mod value;

pub use error::TypeError;
pub use node_type::{CONTENT_NODE_NAME, DEFAULT_NODE_TYPE, ROOT_NODE_TYPE};
pub use path::{validate_node_name, NodePath};
pub use value::Value;
