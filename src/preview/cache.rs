//! Latest rendered page.

use std::sync::Arc;

use parking_lot::RwLock;

/// Immutable rendered page bytes.
pub type Snapshot = Arc<[u8]>;

/// Holds exactly one snapshot; replacing it is atomic for readers.
#[derive(Debug)]
pub struct RenderCache {
    current: RwLock<Snapshot>,
}

impl RenderCache {
    pub fn new(initial: impl Into<Snapshot>) -> Self {
        Self {
            current: RwLock::new(initial.into()),
        }
    }

    /// Current snapshot. The lock is held only for the `Arc` clone.
    pub fn get(&self) -> Snapshot {
        Arc::clone(&self.current.read())
    }

    /// Replace the current snapshot.
    pub fn set(&self, snapshot: impl Into<Snapshot>) {
        let snapshot = snapshot.into();
        let previous = std::mem::replace(&mut *self.current.write(), snapshot);
        // Dropped outside the lock: may be the last reference to a large page.
        drop(previous);
    }
}
