//! Per-user serialization.
//!
//! Every mutation of a user's coaching state or notes runs while holding
//! that user's async mutex. Different users never contend.

use std::sync::Arc;

use coach_types::user::UserId;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<UserId, Arc<Mutex<()>>>;

/// Lazily created async mutex per user.
///
/// An entry lives only while some task holds or waits on it, so the map is
/// bounded by the number of users with work in flight. Cloning shares the
/// underlying map.
#[derive(Debug, Clone, Default)]
pub struct UserLocks {
    inner: Arc<LockMap>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the user's lock. Released when the guard drops.
    pub async fn lock(&self, user_id: UserId) -> UserLockGuard {
        // The DashMap shard guard must be released before awaiting.
        let mutex = {
            let entry = self.inner.entry(user_id).or_default();
            Arc::clone(entry.value())
        };
        let guard = mutex.lock_owned().await;
        UserLockGuard {
            guard: Some(guard),
            locks: Arc::clone(&self.inner),
            user_id,
        }
    }

    /// Number of users currently holding or waiting on a lock.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Holds one user's lock. Dropping it releases the lock and forgets the
/// user's mutex when nobody else is holding or waiting on it.
#[derive(Debug)]
pub struct UserLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
    user_id: UserId,
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        // Release first so the guard's own reference to the mutex is gone.
        self.guard.take();
        // Waiters clone the Arc under the shard lock, so a count of one
        // (the map's) means no task can still reach this mutex.
        self.locks
            .remove_if(&self.user_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_user_is_serialized() {
        let locks = UserLocks::new();
        let user = UserId::new();

        let guard = locks.lock(user).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock(user).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_users_do_not_contend() {
        let locks = UserLocks::new();
        let _a = locks.lock(UserId::new()).await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.lock(UserId::new()))
            .await
            .expect("second user should lock immediately");
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_entries_are_removed() {
        let locks = UserLocks::new();
        let user = UserId::new();

        let guard = locks.lock(user).await;
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert!(locks.is_empty());

        // Still usable after the entry is gone.
        let _again = locks.lock(user).await;
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn test_entry_kept_while_a_waiter_is_queued() {
        let locks = UserLocks::new();
        let user = UserId::new();

        let guard = locks.lock(user).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock(user).await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(guard);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
