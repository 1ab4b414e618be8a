//! Well-known node types and reserved node names.

/// Type given to nodes that have no more specific type: freshly created
/// intermediate ancestors, collection containers, and objects that declare
/// no resource type.
pub const DEFAULT_NODE_TYPE: &str = "nt:unstructured";

/// Type of the store's root node.
pub const ROOT_NODE_TYPE: &str = "rep:root";

/// Name of the sub-node that carries an object's data when its type declares
/// a child type (e.g. a file node and its content node).
pub const CONTENT_NODE_NAME: &str = "jcr:content";
