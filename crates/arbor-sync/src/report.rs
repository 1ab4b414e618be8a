use serde::{Deserialize, Serialize};

use crate::orphans::Pruned;

/// What one top-level synchronization changed in the store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Nodes created for objects, elements, and containers.
    pub nodes_created: usize,
    /// Existing nodes whose type was changed.
    pub nodes_retyped: usize,
    pub properties_written: usize,
    /// Properties removed because their value became null.
    pub properties_removed: usize,
    /// Orphans and emptied containers deleted.
    pub nodes_deleted: usize,
    /// Deletions that failed and were skipped.
    pub failed_deletions: usize,
}

impl SyncReport {
    /// Returns `true` if the call changed the node structure.
    pub fn changed_structure(&self) -> bool {
        self.nodes_created > 0 || self.nodes_retyped > 0 || self.nodes_deleted > 0
    }

    pub(crate) fn absorb(&mut self, pruned: Pruned) {
        self.nodes_deleted += pruned.deleted;
        self.failed_deletions += pruned.failed;
    }
}
