//! Per-container-name mutual exclusion.
//!
//! Lifecycle transitions for the same container name must not interleave
//! (a create racing a remove, a start racing a stop); transitions for
//! distinct names run fully in parallel. Each name gets its own lock slot
//! held only for the engine-call sequence of one transition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of per-name lock slots.
#[derive(Debug, Default)]
pub(crate) struct NameLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl NameLocks {
    /// Runs `f` while holding the lock for `name`. The lock is released on
    /// every exit path, including panics inside `f`.
    pub fn with_lock<T>(&self, name: &str, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(name.to_owned()).or_default())
        };
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn with_lock_returns_closure_value() {
        let locks = NameLocks::default();
        let value = locks.with_lock("web1", || 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn same_name_transitions_are_serialized() {
        let locks = Arc::new(NameLocks::default());
        let in_section = Arc::new(AtomicUsize::new(0));
        let overlap_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let in_section = Arc::clone(&in_section);
                let overlap_seen = Arc::clone(&overlap_seen);
                thread::spawn(move || {
                    locks.with_lock("db1", || {
                        if in_section.fetch_add(1, Ordering::SeqCst) > 0 {
                            let _ = overlap_seen.fetch_add(1, Ordering::SeqCst);
                        }
                        thread::sleep(Duration::from_millis(5));
                        let _ = in_section.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(overlap_seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn different_names_do_not_contend() {
        let locks = Arc::new(NameLocks::default());
        let locks2 = Arc::clone(&locks);

        // Holds "web1" while another thread acquires "db1"; if names
        // contended this would deadlock the test's join below.
        locks.with_lock("web1", || {
            let handle = thread::spawn(move || locks2.with_lock("db1", || true));
            assert!(handle.join().unwrap());
        });
    }
}
