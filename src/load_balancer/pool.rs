//! Live backend pool.
//!
//! # Responsibilities
//! - Own the router's live set and round-robin cursor behind one lock
//! - Serve selections to request handlers
//! - Apply add/remove/reconcile from the event subscriber and resync task
//!
//! The lock is a plain `std::sync::Mutex`: it is only ever held for the
//! in-memory read-modify-write, never across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::load_balancer::{backend::Backend, round_robin::RoundRobin};
use crate::observability::metrics;

/// Shared, lock-guarded router state.
#[derive(Debug, Default)]
pub struct BackendPool {
    inner: Mutex<RoundRobin>,
}

impl BackendPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool seeded from the initial registry load.
    pub fn with_backends(backends: Vec<Backend>) -> Self {
        let rr = RoundRobin::from_backends(backends);
        metrics::record_live_backends(rr.len());
        Self {
            inner: Mutex::new(rr),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RoundRobin> {
        // A panic while holding the lock cannot leave the rotation
        // structurally broken, so keep serving.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Select the next backend, or `None` when no backend is live.
    pub fn next_backend(&self) -> Option<Backend> {
        self.lock().next_server()
    }

    /// Add a backend at the end of the rotation. Returns false if already present.
    pub fn add(&self, backend: Backend) -> bool {
        let mut rr = self.lock();
        let added = rr.insert(backend);
        if added {
            metrics::record_live_backends(rr.len());
        }
        added
    }

    /// Remove a backend. Returns false if it was not present.
    pub fn remove(&self, id: &str) -> bool {
        let mut rr = self.lock();
        let removed = rr.remove(id).is_some();
        if removed {
            metrics::record_live_backends(rr.len());
        }
        removed
    }

    /// Converge on a fresh healthy set from the registry.
    pub fn reconcile(&self, healthy: &[Backend]) -> (Vec<String>, Vec<String>) {
        let mut rr = self.lock();
        let diff = rr.reconcile(healthy);
        metrics::record_live_backends(rr.len());
        diff
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the live set in rotation order.
    pub fn snapshot(&self) -> Vec<Backend> {
        self.lock().backends().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn backend(id: &str) -> Backend {
        Backend::new(id, format!("http://{}", id))
    }

    #[test]
    fn test_pool_add_remove() {
        let pool = BackendPool::new();
        assert!(pool.next_backend().is_none());

        assert!(pool.add(backend("b1")));
        assert!(!pool.add(backend("b1")));
        assert_eq!(pool.len(), 1);

        assert!(pool.remove("b1"));
        assert!(!pool.remove("b1"));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_concurrent_selection_during_mutation() {
        let universe: Vec<String> = (0..8).map(|i| format!("b{}", i)).collect();
        let pool = Arc::new(BackendPool::with_backends(
            universe.iter().map(|id| backend(id)).collect(),
        ));

        let mutator = {
            let pool = pool.clone();
            let universe = universe.clone();
            thread::spawn(move || {
                for round in 0..2_000 {
                    let id = &universe[round % universe.len()];
                    if round % 3 == 0 {
                        pool.add(backend(id));
                    } else {
                        pool.remove(id);
                    }
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                let universe = universe.clone();
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        if let Some(b) = pool.next_backend() {
                            assert!(universe.contains(&b.id));
                        }
                    }
                })
            })
            .collect();

        mutator.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }

        let snapshot = pool.snapshot();
        let mut ids: Vec<_> = snapshot.iter().map(|b| b.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), snapshot.len());
    }
}
