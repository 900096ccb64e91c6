//! Round-robin load balancing strategy.

use crate::load_balancer::backend::Backend;

/// Ordered live set plus its rotation cursor.
///
/// The set and the cursor are one unit: every method takes `&mut self`, so the
/// owner serializes selection and mutation behind a single lock.
///
/// Invariants:
/// - no two entries share an id
/// - `cursor < backends.len()` whenever the set is non-empty
/// - order is insertion order; new backends rotate in at the end
#[derive(Debug, Default)]
pub struct RoundRobin {
    backends: Vec<Backend>,
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rotation from an initial load, dropping duplicate ids.
    pub fn from_backends(backends: impl IntoIterator<Item = Backend>) -> Self {
        let mut rr = Self::new();
        for backend in backends {
            rr.insert(backend);
        }
        rr
    }

    /// Pick the next backend and advance the cursor.
    ///
    /// The index is reduced modulo the length observed right now, so a cursor
    /// left behind by a shrink can never address past the end.
    pub fn next_server(&mut self) -> Option<Backend> {
        let len = self.backends.len();
        if len == 0 {
            return None;
        }

        let index = self.cursor % len;
        self.cursor = (index + 1) % len;
        Some(self.backends[index].clone())
    }

    /// Append a backend. Returns false (and changes nothing) if the id is present.
    pub fn insert(&mut self, backend: Backend) -> bool {
        if self.contains(&backend.id) {
            return false;
        }
        self.backends.push(backend);
        true
    }

    /// Remove a backend by id. Absent ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<Backend> {
        let pos = self.backends.iter().position(|b| b.id == id)?;
        let removed = self.backends.remove(pos);

        // Keep pointing at the backend that would have been served next.
        if pos < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.backends.len() {
            self.cursor = 0;
        }
        Some(removed)
    }

    /// Converge on `healthy` while preserving the rotation of survivors.
    ///
    /// Entries missing from `healthy` are removed, ids not yet present are
    /// appended in the given order, and a changed URL is updated in place.
    /// Returns `(added, removed)` ids.
    pub fn reconcile(&mut self, healthy: &[Backend]) -> (Vec<String>, Vec<String>) {
        let stale: Vec<String> = self
            .backends
            .iter()
            .filter(|b| !healthy.iter().any(|h| h.id == b.id))
            .map(|b| b.id.clone())
            .collect();
        for id in &stale {
            self.remove(id);
        }

        let mut added = Vec::new();
        for backend in healthy {
            match self.backends.iter_mut().find(|b| b.id == backend.id) {
                Some(existing) => {
                    if existing.url != backend.url {
                        existing.url = backend.url.clone();
                    }
                }
                None => {
                    self.backends.push(backend.clone());
                    added.push(backend.id.clone());
                }
            }
        }

        (added, stale)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.backends.iter().any(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(id: &str) -> Backend {
        Backend::new(id, format!("http://{}:8080", id))
    }

    fn rotation(ids: &[&str]) -> RoundRobin {
        RoundRobin::from_backends(ids.iter().map(|id| backend(id)))
    }

    fn ids(rr: &RoundRobin) -> Vec<&str> {
        rr.backends().iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_round_robin() {
        let mut lb = rotation(&["b1", "b2", "b3"]);

        let picks: Vec<String> = (0..4).map(|_| lb.next_server().unwrap().id).collect();
        assert_eq!(picks, vec!["b1", "b2", "b3", "b1"]);
    }

    #[test]
    fn test_empty_set_selects_nothing() {
        let mut lb = RoundRobin::new();
        assert!(lb.next_server().is_none());

        lb.insert(backend("b1"));
        lb.remove("b1");
        assert!(lb.next_server().is_none());
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut lb = rotation(&["b1", "b2"]);
        assert!(!lb.insert(Backend::new("b1", "http://elsewhere")));
        assert_eq!(ids(&lb), vec!["b1", "b2"]);
        assert_eq!(lb.backends()[0].url, "http://b1:8080");
    }

    #[test]
    fn test_initial_load_drops_duplicates() {
        let lb = rotation(&["b1", "b2", "b1"]);
        assert_eq!(ids(&lb), vec!["b1", "b2"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut lb = rotation(&["b1", "b2"]);
        lb.next_server();
        assert!(lb.remove("b9").is_none());
        assert_eq!(lb.next_server().unwrap().id, "b2");
    }

    #[test]
    fn test_removing_current_last_entry_wraps() {
        let mut lb = rotation(&["b1", "b2", "b3"]);
        lb.next_server();
        lb.next_server();
        // Cursor now addresses b3.
        lb.remove("b3");
        assert_eq!(lb.next_server().unwrap().id, "b1");
    }

    #[test]
    fn test_removing_lower_index_keeps_rotation() {
        let mut lb = rotation(&["b1", "b2", "b3", "b4"]);
        lb.next_server();
        lb.next_server();
        // Next up is b3; drop b1 which sits before the cursor.
        lb.remove("b1");
        assert_eq!(lb.next_server().unwrap().id, "b3");
        assert_eq!(lb.next_server().unwrap().id, "b4");
        assert_eq!(lb.next_server().unwrap().id, "b2");
    }

    #[test]
    fn test_shrink_never_selects_removed_backend() {
        for victim in 0..4 {
            for advance in 0..4 {
                let mut lb = rotation(&["b1", "b2", "b3", "b4"]);
                for _ in 0..advance {
                    lb.next_server();
                }
                let victim_id = format!("b{}", victim + 1);
                lb.remove(&victim_id);
                for _ in 0..6 {
                    let picked = lb.next_server().unwrap();
                    assert_ne!(picked.id, victim_id);
                    assert!(lb.contains(&picked.id));
                }
            }
        }
    }

    #[test]
    fn test_fairness_after_append() {
        let mut lb = rotation(&["b1", "b2"]);
        lb.insert(backend("b3"));
        let picks: Vec<String> = (0..3).map(|_| lb.next_server().unwrap().id).collect();
        assert_eq!(picks, vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn test_reconcile_preserves_survivor_order() {
        let mut lb = rotation(&["b1", "b2", "b3"]);
        let (added, removed) = lb.reconcile(&[backend("b4"), backend("b3"), backend("b1")]);

        assert_eq!(added, vec!["b4"]);
        assert_eq!(removed, vec!["b2"]);
        assert_eq!(ids(&lb), vec!["b1", "b3", "b4"]);
    }

    #[test]
    fn test_reconcile_updates_moved_url() {
        let mut lb = rotation(&["b1"]);
        let (added, removed) = lb.reconcile(&[Backend::new("b1", "http://new:9000")]);
        assert!(added.is_empty());
        assert!(removed.is_empty());
        assert_eq!(lb.backends()[0].url, "http://new:9000");
    }

    #[test]
    fn test_arbitrary_event_sequences_keep_ids_unique() {
        let mut lb = RoundRobin::new();
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..500 {
            let id = format!("b{}", rng.usize(0..6));
            if rng.bool() {
                lb.insert(backend(&id));
            } else {
                lb.remove(&id);
            }
            let mut seen = std::collections::HashSet::new();
            assert!(lb.backends().iter().all(|b| seen.insert(b.id.clone())));
            if !lb.is_empty() {
                assert!(lb.cursor < lb.len());
            }
        }
    }
}
