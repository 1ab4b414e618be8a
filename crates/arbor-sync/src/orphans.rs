//! Best-effort removal of nodes that no longer mirror anything.
//!
//! Failures here never abort a synchronization: each one is logged and
//! counted, and the pass moves on to the next node.

use std::collections::HashSet;

use arbor_store::NodeStore;
use arbor_types::NodePath;
use tracing::{debug, warn};

/// Outcome of a deletion pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pruned {
    pub deleted: usize,
    pub failed: usize,
}

/// Delete every child of `container` whose path is not in `keep` and whose
/// name is not in `protected`.
///
/// A missing container is a no-op.
pub fn delete_orphans(
    store: &dyn NodeStore,
    container: &NodePath,
    keep: &HashSet<NodePath>,
    protected: &HashSet<String>,
) -> Pruned {
    let mut pruned = Pruned::default();

    let children = match store.node(container) {
        Ok(Some(_)) => match store.children(container) {
            Ok(children) => children,
            Err(e) => {
                warn!(container = %container, error = %e, "listing children failed; orphans kept");
                return pruned;
            }
        },
        Ok(None) => return pruned,
        Err(e) => {
            warn!(container = %container, error = %e, "container lookup failed; orphans kept");
            return pruned;
        }
    };

    for child in children {
        if keep.contains(&child.path) {
            continue;
        }
        if child.name().is_some_and(|name| protected.contains(name)) {
            continue;
        }
        match store.delete(&child.path) {
            Ok(_) => {
                debug!(path = %child.path, "orphan deleted");
                pruned.deleted += 1;
            }
            Err(e) => {
                warn!(path = %child.path, error = %e, "failed to delete orphan");
                pruned.failed += 1;
            }
        }
    }
    pruned
}

/// Delete a container whose collection or map became empty.
pub fn delete_container(store: &dyn NodeStore, container: &NodePath) -> Pruned {
    match store.delete(container) {
        Ok(true) => {
            debug!(path = %container, "empty container deleted");
            Pruned { deleted: 1, failed: 0 }
        }
        Ok(false) => Pruned::default(),
        Err(e) => {
            warn!(path = %container, error = %e, "failed to delete empty container");
            Pruned { deleted: 0, failed: 1 }
        }
    }
}
