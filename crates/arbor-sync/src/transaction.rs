//! The commit boundary of a synchronization call.

use arbor_store::NodeStore;
use tracing::debug;

use crate::error::SyncResult;

/// Scope tracking how deep the current persist call is nested.
///
/// Every persist runs inside [`Transaction::scope`]. Nested persists share
/// the store's single pending transaction; only the outermost scope commits,
/// and only when it succeeds. A failed call leaves its staged changes
/// uncommitted for the caller to discard or retry.
pub struct Transaction<'s> {
    store: &'s dyn NodeStore,
    depth: usize,
}

impl<'s> Transaction<'s> {
    pub fn begin(store: &'s dyn NodeStore) -> Self {
        Self { store, depth: 0 }
    }

    pub fn store(&self) -> &'s dyn NodeStore {
        self.store
    }

    /// Current nesting depth; `0` outside any scope.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run `f` one level deeper, committing if this is the outermost scope
    /// and `f` succeeded.
    pub fn scope<T>(&mut self, f: impl FnOnce(&mut Self) -> SyncResult<T>) -> SyncResult<T> {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        let value = result?;
        if self.depth == 0 {
            self.store.commit()?;
            debug!("transaction committed");
        }
        Ok(value)
    }
}
