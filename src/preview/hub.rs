//! Reload broadcast to connected browser tabs.
//!
//! Every subscriber owns a channel of depth one. `broadcast` never blocks:
//! a subscriber that has not drained its previous signal simply misses this
//! one, which is harmless because any later signal reloads the latest page.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Registry of reload subscribers.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    subscribers: Mutex<FxHashMap<u64, Sender<()>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. It stays registered until the returned guard
    /// is dropped.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = channel::bounded(1);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        // Checked under the lock so `close` cannot miss this sender.
        let mut subscribers = self.subscribers.lock();
        if !self.closed.load(Ordering::SeqCst) {
            subscribers.insert(id, tx);
        }
        drop(subscribers);

        Subscription {
            id,
            rx,
            hub: Arc::clone(self),
        }
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().remove(&id);
    }

    /// Send one reload token to every subscriber that has room for it.
    pub fn broadcast(&self) {
        let subscribers = self.subscribers.lock();
        for tx in subscribers.values() {
            // Full: a reload is already pending. Disconnected: the guard cleans up.
            let _ = tx.try_send(());
        }
        crate::debug!("reload"; "broadcast to {} client(s)", subscribers.len());
    }

    /// Drop every sender so all subscriber streams end. Later subscribers
    /// are disconnected from the start.
    pub fn close(&self) {
        let mut subscribers = self.subscribers.lock();
        self.closed.store(true, Ordering::SeqCst);
        subscribers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A registered subscriber; unregisters itself on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: Receiver<()>,
    hub: Arc<BroadcastHub>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}
