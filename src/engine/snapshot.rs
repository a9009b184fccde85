//! Single-writer snapshot cells.
//!
//! Configuration state crosses from the owning thread to the hook thread as
//! whole immutable snapshots: the writer swaps in a fresh `Arc`, readers
//! clone the current one. A reader either sees the whole old snapshot or
//! the whole new one, and a snapshot already handed out stays valid until
//! its last holder drops it.

use parking_lot::RwLock;
use std::sync::Arc;

/// Holds the currently published snapshot of `T`.
///
/// The write lock is held only for the duration of an `Arc` pointer swap,
/// so the hook-thread reader never waits on anything longer than that.
/// Visibility follows the lock: a `publish` that has returned is seen by
/// every subsequent `read`.
pub struct SnapshotCell<T> {
    current: RwLock<Arc<T>>,
}

impl<T> SnapshotCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Replace the snapshot wholesale. Called only by the owning thread.
    pub fn publish(&self, value: T) {
        *self.current.write() = Arc::new(value);
    }

    /// Get the current snapshot. Safe to call from the hook callback.
    pub fn read(&self) -> Arc<T> {
        self.current.read().clone()
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
