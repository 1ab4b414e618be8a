//! Plain-text rendering of a subtree, for diagnostics and the CLI.

use arbor_types::NodePath;

use crate::error::{StoreError, StoreResult};
use crate::traits::NodeStore;

/// Render the subtree rooted at `path` as indented text.
///
/// Each node prints as `name [type]` followed by its properties as
/// `- key = value`, children indented by two spaces.
pub fn render_tree(store: &dyn NodeStore, path: &NodePath) -> StoreResult<String> {
    let mut out = String::new();
    render_node(store, path, 0, &mut out)?;
    Ok(out)
}

fn render_node(
    store: &dyn NodeStore,
    path: &NodePath,
    depth: usize,
    out: &mut String,
) -> StoreResult<()> {
    let node = store
        .node(path)?
        .ok_or_else(|| StoreError::NotFound(path.clone()))?;
    let indent = "  ".repeat(depth);
    let name = node.name().unwrap_or("/");
    out.push_str(&format!("{indent}{name} [{}]\n", node.node_type));
    for (key, value) in store.properties(path)? {
        out.push_str(&format!("{indent}  - {key} = {value}\n"));
    }
    for child in store.children(path)? {
        render_node(store, &child.path, depth + 1, out)?;
    }
    Ok(())
}
