//! Per-key mutual exclusion.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

/// Registry of lazily created async locks, one per key.
///
/// Holders of the same key are serialized; different keys never contend
/// beyond the brief registry lookup. Entries live as long as the registry.
#[derive(Debug, Default)]
pub struct AddressLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl AddressLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `key`, creating it on first use.
    pub fn lock_for(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(key) {
            return Arc::clone(lock);
        }
        trace!(key, "Creating signer lock");
        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(key.to_string(), Arc::clone(&lock));
        lock
    }

    /// Waits for exclusive use of `key`. Released when the guard drops.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        self.lock_for(key).lock_owned().await
    }

    /// Number of keys seen so far.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::task::JoinSet;

    #[test]
    fn test_same_key_same_lock() {
        let locks = AddressLocks::new();
        let a = locks.lock_for("alice");
        let b = locks.lock_for("alice");
        let c = locks.lock_for("bob");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_same_key_is_serialized() {
        let locks = Arc::new(AddressLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            tasks.spawn(async move {
                let _guard = locks.acquire("alice").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            });
        }
        while let Some(res) = tasks.join_next().await {
            res.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = AddressLocks::new();
        let _alice = locks.acquire("alice").await;

        let bob = tokio::time::timeout(Duration::from_secs(1), locks.acquire("bob")).await;
        assert!(bob.is_ok());

        let alice_again =
            tokio::time::timeout(Duration::from_millis(20), locks.acquire("alice")).await;
        assert!(alice_again.is_err());
    }
}
