//! Keyed mutexes for serializing writers
//!
//! One lock per case id and one per asset id. A transition holds its case
//! lock first, then the asset lock, so two requests can never interleave
//! their read-check-commit sequence on the same record.

use dashmap::DashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct LockTable {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, key: &str) -> Arc<Mutex<()>> {
        // Clone the Arc out so the shard lock is released before we block
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding the lock for `key`
    pub fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.handle(key);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        f()
    }

    /// Number of keys ever locked
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    #[test]
    fn test_same_key_is_exclusive() {
        let table = Arc::new(LockTable::new());
        let inside = Arc::new(AtomicU32::new(0));
        let max_seen = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    table.with_lock("CASE-1", || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_nested_different_keys() {
        let table = LockTable::new();
        let value = table.with_lock("CASE-1", || table.with_lock("AST-1", || 42));
        assert_eq!(value, 42);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let table = Arc::new(LockTable::new());
        let t = Arc::clone(&table);
        let _ = thread::spawn(move || {
            t.with_lock("AST-1", || panic!("boom"));
        })
        .join();

        assert_eq!(table.with_lock("AST-1", || 7), 7);
    }
}
