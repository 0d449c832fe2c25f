//! Per-user lock registry.
//!
//! Serializes all mutating operations for the same user identity while
//! operations for distinct identities proceed fully in parallel. Waiters
//! for one identity are granted access in arrival order: each entry wraps a
//! tokio `Mutex`, whose semaphore-backed waiter queue is FIFO and whose
//! acquire future is cancel-safe (a dropped waiter leaves the queue without
//! blocking the ones behind it).
//!
//! Entries are refcounted and removed when the last holder/waiter for an
//! identity is gone, so the map never grows with every user ever seen.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core_types::UserId;

struct LockEntry {
    mutex: Arc<Mutex<()>>,
    // Holders plus waiters currently interested in this identity.
    refs: AtomicUsize,
}

/// Registry of per-user exclusive critical sections.
#[derive(Default)]
pub struct UserLockRegistry {
    entries: DashMap<UserId, Arc<LockEntry>>,
}

/// Held exclusive access to one user identity.
///
/// Released on drop: the mutex is unlocked and the registry bookkeeping for
/// the identity is removed once no holder or waiter remains. Covers every
/// exit path of the protected section, including error returns and unwind.
pub struct UserLockGuard {
    // Drop order matters: unlock the mutex before the refcount release
    // decides whether the entry can be removed.
    _permit: OwnedMutexGuard<()>,
    _release: RefRelease,
}

impl UserLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the calling task until no other holder/waiter chain exists for
    /// `user_id`, then return the held guard. Never blocks tasks operating
    /// on other identities.
    pub async fn acquire(self: &Arc<Self>, user_id: UserId) -> UserLockGuard {
        let entry = {
            let slot = self.entries.entry(user_id).or_insert_with(|| {
                Arc::new(LockEntry {
                    mutex: Arc::new(Mutex::new(())),
                    refs: AtomicUsize::new(0),
                })
            });
            // Registered while the map shard is locked, so a concurrent
            // cleanup cannot remove the entry between lookup and register.
            slot.value().refs.fetch_add(1, Ordering::SeqCst);
            Arc::clone(slot.value())
        };

        // If the caller abandons the wait, this guard drops and the
        // waiter's registration is removed without corrupting the queue.
        let release = RefRelease {
            registry: Arc::clone(self),
            user_id,
            entry: Arc::clone(&entry),
        };

        let permit = Arc::clone(&entry.mutex).lock_owned().await;

        UserLockGuard {
            _permit: permit,
            _release: release,
        }
    }

    /// Number of identities with live bookkeeping. Zero when idle.
    pub fn active_entries(&self) -> usize {
        self.entries.len()
    }

    fn release_ref(&self, user_id: UserId, entry: &Arc<LockEntry>) {
        if entry.refs.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Re-checked under the shard lock: a new waiter may have
            // registered between the decrement and the removal.
            self.entries
                .remove_if(&user_id, |_, e| e.refs.load(Ordering::SeqCst) == 0);
        }
    }
}

struct RefRelease {
    registry: Arc<UserLockRegistry>,
    user_id: UserId,
    entry: Arc<LockEntry>,
}

impl Drop for RefRelease {
    fn drop(&mut self) {
        self.registry.release_ref(self.user_id, &self.entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn entry_removed_after_release() {
        let registry = Arc::new(UserLockRegistry::new());
        let guard = registry.acquire(1).await;
        assert_eq!(registry.active_entries(), 1);
        drop(guard);
        assert_eq!(registry.active_entries(), 0);
    }

    #[tokio::test]
    async fn same_user_is_mutually_exclusive() {
        let registry = Arc::new(UserLockRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let registry = Arc::clone(&registry);
            let counter = Arc::clone(&counter);
            tasks.push(tokio::spawn(async move {
                let _guard = registry.acquire(7).await;
                // Unsynchronized read-modify-write: only safe if the lock
                // actually serializes the critical section.
                let seen = counter.load(Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
                counter.store(seen + 1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 32);
        assert_eq!(registry.active_entries(), 0);
    }

    #[tokio::test]
    async fn distinct_users_do_not_block_each_other() {
        let registry = Arc::new(UserLockRegistry::new());
        let _held = registry.acquire(1).await;

        // Holding user 1 must not delay user 2 at all.
        let registry2 = Arc::clone(&registry);
        let other = tokio::time::timeout(Duration::from_millis(100), async move {
            let _guard = registry2.acquire(2).await;
        })
        .await;
        assert!(other.is_ok(), "user 2 was blocked by user 1's lock");
    }

    #[tokio::test]
    async fn waiters_are_granted_in_arrival_order() {
        let registry = Arc::new(UserLockRegistry::new());
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let first = registry.acquire(5).await;

        let mut tasks = Vec::new();
        for i in 0..8u32 {
            let registry = Arc::clone(&registry);
            let order = Arc::clone(&order);
            tasks.push(tokio::spawn(async move {
                let _guard = registry.acquire(5).await;
                order.lock().await.push(i);
            }));
            // Let the waiter enqueue before spawning the next one.
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        drop(first);
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(*order.lock().await, (0..8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn cancelled_waiter_leaves_no_stale_entry() {
        let registry = Arc::new(UserLockRegistry::new());
        let held = registry.acquire(3).await;

        let registry2 = Arc::clone(&registry);
        let waiter = tokio::spawn(async move {
            let _guard = registry2.acquire(3).await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        waiter.abort();
        let _ = waiter.await;

        drop(held);
        // The aborted waiter must not keep the identity's bookkeeping alive
        // or block a fresh acquire.
        let _fresh = tokio::time::timeout(Duration::from_millis(100), registry.acquire(3))
            .await
            .expect("fresh acquire blocked by aborted waiter");
        drop(_fresh);
        assert_eq!(registry.active_entries(), 0);
    }
}
