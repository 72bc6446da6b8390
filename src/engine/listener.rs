//! Listener contract and the concurrency-safe listener set.

use crate::cct::CctNode;
use std::sync::{Arc, Mutex};

/// Observer of batch-boundary events produced by the engine.
///
/// Callbacks are delivered synchronously on the thread driving the
/// batch (for `cct_established`) or the thread calling `reset` (for
/// `cct_reset`). `cct_established` runs while the engine's batch lock
/// is held: a listener may register or deregister listeners from
/// inside a callback, but must not call batch operations (`record`,
/// `on_batch_stop`, `reset`, ...) reentrantly.
pub trait CctListener: Send + Sync {
    /// A batch completed and the aggregate tree is available.
    ///
    /// `empty` is true when no event was recorded since the matching
    /// batch start. The `root` borrow is only valid for the duration
    /// of the call; clone whatever needs to outlive it.
    fn cct_established(&self, root: &CctNode, empty: bool);

    /// Accumulated state was discarded via `reset`.
    fn cct_reset(&self);
}

/// Set of registered listeners.
///
/// Identity is `Arc` pointer identity; duplicates are rejected.
/// Mutation is safe while a notification is in flight: notifications
/// iterate over a snapshot taken at iteration start, so an add or
/// remove during delivery affects only subsequent notifications.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Mutex<Vec<Arc<dyn CctListener>>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns false if it was already present.
    pub fn add(&self, listener: Arc<dyn CctListener>) -> bool {
        let mut listeners = self.lock();
        if listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Deregister a listener. Returns false if it was not present.
    pub fn remove(&self, listener: &Arc<dyn CctListener>) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the current listeners for notification delivery
    pub fn snapshot(&self) -> Vec<Arc<dyn CctListener>> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<dyn CctListener>>> {
        // A poisoned lock only means a listener panicked mid-iteration;
        // the vector itself is still consistent.
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener {
        established: AtomicUsize,
        resets: AtomicUsize,
    }

    impl CountingListener {
        fn new() -> Self {
            Self {
                established: AtomicUsize::new(0),
                resets: AtomicUsize::new(0),
            }
        }
    }

    impl CctListener for CountingListener {
        fn cct_established(&self, _root: &CctNode, _empty: bool) {
            self.established.fetch_add(1, Ordering::SeqCst);
        }

        fn cct_reset(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let set = ListenerSet::new();
        let listener: Arc<dyn CctListener> = Arc::new(CountingListener::new());

        assert!(set.add(Arc::clone(&listener)));
        assert!(!set.add(Arc::clone(&listener)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_missing_listener() {
        let set = ListenerSet::new();
        let registered: Arc<dyn CctListener> = Arc::new(CountingListener::new());
        let stranger: Arc<dyn CctListener> = Arc::new(CountingListener::new());

        set.add(Arc::clone(&registered));
        assert!(!set.remove(&stranger));
        assert!(set.remove(&registered));
        assert!(set.is_empty());
    }

    #[test]
    fn test_snapshot_isolated_from_mutation() {
        let set = ListenerSet::new();
        let a: Arc<dyn CctListener> = Arc::new(CountingListener::new());
        let b: Arc<dyn CctListener> = Arc::new(CountingListener::new());
        set.add(Arc::clone(&a));

        let snapshot = set.snapshot();
        set.add(Arc::clone(&b));
        set.remove(&a);

        assert_eq!(snapshot.len(), 1);
        assert!(Arc::ptr_eq(&snapshot[0], &a));
        assert_eq!(set.len(), 1);
    }
}
