//! Table-backed distributed lock implementation.

use std::fmt;
use std::time::Duration;

use table_lock_core::capability::Capabilities;
use table_lock_core::error::{LockError, LockResult};
use table_lock_core::store::{InsertOutcome, LockRecord, LockStore};
use table_lock_core::traits::DistributedLock;
use tokio::time::Instant;
use tracing::{Span, debug, field, instrument, warn};
use uuid::Uuid;

use crate::name::derive_lock_name;
use crate::options::DatabaseLockOptions;

/// Deadline offset used when the wait budget overflows the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// How a wait for release ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitOutcome {
    /// The row disappeared; retry the insert promptly.
    Released,
    /// The wait budget elapsed with the row still present.
    TimedOut,
}

/// A distributed lock whose ownership is a row in a shared table.
///
/// Each value is one acquisition handle with its own holder token. The row
/// `(name, value)` is inserted on acquire and deleted on release; the
/// store's unique index on `name` decides who wins under contention.
///
/// Dropping an acquired handle schedules a best-effort delete on the current
/// tokio runtime. Use [`DistributedLock::scoped`] or an explicit
/// [`DistributedLock::release`] to observe release errors.
pub struct DatabaseLock<S: LockStore> {
    /// The caller-supplied subject.
    subject: String,
    /// Derived contention key.
    name: String,
    /// Holder token unique to this handle.
    value: String,
    options: DatabaseLockOptions,
    acquired: bool,
    /// An insert was issued whose row may exist without `acquired` being set,
    /// e.g. when the acquire future was dropped mid-insert.
    insert_pending: bool,
    store: S,
}

impl<S: LockStore> DatabaseLock<S> {
    /// Creates an unacquired handle for `subject` scoped to `namespace`.
    pub fn new(
        store: S,
        namespace: &str,
        subject: &str,
        options: DatabaseLockOptions,
    ) -> LockResult<Self> {
        let name = derive_lock_name(namespace, subject)?;
        Ok(Self {
            subject: subject.to_string(),
            name,
            value: Uuid::new_v4().to_string(),
            options,
            acquired: false,
            insert_pending: false,
            store,
        })
    }

    /// Returns this handle's holder token.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the advisory lifetime recorded with the row.
    pub fn ttl(&self) -> Duration {
        self.options.ttl
    }

    fn check_capabilities(&self, requested: Capabilities) -> LockResult<()> {
        let supported = <Self as DistributedLock>::capabilities();
        if !requested.contains(Capabilities::EXCLUSIVE) || !supported.contains(requested) {
            return Err(LockError::InsufficientCapability {
                requested,
                supported,
            });
        }
        Ok(())
    }

    /// Attempts to insert this handle's row.
    ///
    /// A conflict on a row carrying our own token counts as held.
    async fn try_lock(&mut self) -> LockResult<bool> {
        let record = LockRecord {
            name: self.name.clone(),
            value: self.value.clone(),
            ttl: self.options.ttl_seconds(),
        };

        // Cleared only once the outcome is known; until then the row may exist.
        self.insert_pending = true;
        let held = match self.store.insert(&record).await? {
            InsertOutcome::Inserted => true,
            InsertOutcome::Conflict => {
                let holder = self.store.holder(&self.name).await?;
                holder.as_deref() == Some(self.value.as_str())
            }
        };

        self.acquired = held;
        self.insert_pending = false;
        Ok(held)
    }

    /// Polls until the row disappears or the wait budget elapses.
    async fn wait_for_release(&self) -> LockResult<WaitOutcome> {
        let start = Instant::now();
        let deadline = start
            .checked_add(self.options.wait_budget())
            .unwrap_or_else(|| start + FAR_FUTURE);

        loop {
            if self.store.holder(&self.name).await?.is_none() {
                return Ok(WaitOutcome::Released);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(WaitOutcome::TimedOut);
            }
            tokio::time::sleep(self.options.poll_interval.min(deadline - now)).await;
        }
    }
}

impl<S: LockStore> DistributedLock for DatabaseLock<S> {
    fn capabilities() -> Capabilities {
        Capabilities::EXCLUSIVE | Capabilities::NO_BLOCK
    }

    fn subject(&self) -> &str {
        &self.subject
    }

    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        skip(self),
        fields(
            lock.name = %self.name,
            backend = self.store.backend(),
            acquired = field::Empty,
            elapsed_ms = field::Empty,
        )
    )]
    async fn acquire(&mut self, capabilities: Capabilities) -> LockResult<bool> {
        self.check_capabilities(capabilities)?;

        if self.acquired {
            Span::current().record("acquired", true);
            return Ok(true);
        }

        let start = Instant::now();
        let mut timed_out = false;

        loop {
            if self.try_lock().await? {
                Span::current().record("acquired", true);
                Span::current().record("elapsed_ms", start.elapsed().as_millis() as u64);
                return Ok(true);
            }

            if capabilities.is_non_blocking() {
                Span::current().record("acquired", false);
                return Err(LockError::WouldBlock {
                    name: self.name.clone(),
                });
            }

            if timed_out {
                let waited = start.elapsed();
                Span::current().record("acquired", false);
                Span::current().record("elapsed_ms", waited.as_millis() as u64);
                return Err(LockError::AcquireFailed {
                    name: self.name.clone(),
                    waited,
                });
            }

            debug!("lock held by another holder, waiting for release");
            // One last insert attempt follows a timed-out wait before giving up.
            timed_out = self.wait_for_release().await? == WaitOutcome::TimedOut;
        }
    }

    #[instrument(skip(self), fields(lock.name = %self.name, backend = self.store.backend()))]
    async fn release(&mut self) -> LockResult<bool> {
        if !self.acquired && !self.insert_pending {
            return Ok(true);
        }

        let removed = self.store.delete(&self.name, &self.value).await?;
        if removed == 0 && self.acquired {
            warn!("lock row was already gone when releasing");
        }

        self.acquired = false;
        self.insert_pending = false;
        Ok(true)
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }
}

impl<S: LockStore> fmt::Debug for DatabaseLock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseLock")
            .field("subject", &self.subject)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("acquired", &self.acquired)
            .field("insert_pending", &self.insert_pending)
            .field("backend", &self.store.backend())
            .finish()
    }
}

impl<S: LockStore> Drop for DatabaseLock<S> {
    fn drop(&mut self) {
        if !self.acquired && !self.insert_pending {
            return;
        }
        self.acquired = false;
        self.insert_pending = false;

        let store = self.store.clone();
        let name = std::mem::take(&mut self.name);
        let value = std::mem::take(&mut self.value);

        // Drop is synchronous, so the delete runs as a background task.
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(e) = store.delete(&name, &value).await {
                        warn!(lock.name = %name, error = %e, "failed to release dropped lock");
                    }
                });
            }
            Err(_) => {
                warn!(lock.name = %name, "lock dropped outside a tokio runtime, row left in place");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLockStore;

    /// Store whose insert commits immediately but reports back late.
    #[derive(Debug, Clone, Default)]
    struct SlowAckStore {
        inner: MemoryLockStore,
    }

    impl LockStore for SlowAckStore {
        fn backend(&self) -> &'static str {
            "slow-ack"
        }

        async fn insert(&self, record: &LockRecord) -> LockResult<InsertOutcome> {
            let outcome = self.inner.insert(record).await?;
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(outcome)
        }

        async fn holder(&self, name: &str) -> LockResult<Option<String>> {
            self.inner.holder(name).await
        }

        async fn delete(&self, name: &str, value: &str) -> LockResult<u64> {
            self.inner.delete(name, value).await
        }
    }

    fn slow_ack_lock(store: &SlowAckStore) -> DatabaseLock<SlowAckStore> {
        DatabaseLock::new(
            store.clone(),
            "test-namespace",
            "slow-ack",
            DatabaseLockOptions::default(),
        )
        .unwrap()
    }

    fn lock(store: &MemoryLockStore, subject: &str) -> DatabaseLock<MemoryLockStore> {
        DatabaseLock::new(
            store.clone(),
            "test-namespace",
            subject,
            DatabaseLockOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_tokens_are_unique_per_handle() {
        let store = MemoryLockStore::new();
        let a = lock(&store, "subject");
        let b = lock(&store, "subject");
        assert_eq!(a.name(), b.name());
        assert_ne!(a.value(), b.value());
    }

    #[tokio::test]
    async fn test_try_lock_accepts_own_row() {
        let store = MemoryLockStore::new();
        let mut handle = lock(&store, "own-row");

        // A previous attempt by this handle already wrote the row.
        store
            .insert(&LockRecord {
                name: handle.name().to_string(),
                value: handle.value().to_string(),
                ttl: 30,
            })
            .await
            .unwrap();

        assert!(handle.try_lock().await.unwrap());
    }

    #[tokio::test]
    async fn test_try_lock_rejects_foreign_row() {
        let store = MemoryLockStore::new();
        let mut holder = lock(&store, "foreign-row");
        let mut contender = lock(&store, "foreign-row");

        holder.acquire(Capabilities::EXCLUSIVE).await.unwrap();
        assert!(!contender.try_lock().await.unwrap());
        assert!(!contender.insert_pending);
        holder.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_capability_checks() {
        let store = MemoryLockStore::new();
        let mut handle = lock(&store, "caps");

        for requested in [
            Capabilities::empty(),
            Capabilities::NO_BLOCK,
            Capabilities::SHARED,
            Capabilities::SHARED | Capabilities::EXCLUSIVE,
            Capabilities::EXCLUSIVE | Capabilities::from_bits(0x80),
        ] {
            let err = handle.acquire(requested).await.unwrap_err();
            assert!(
                matches!(err, LockError::InsufficientCapability { .. }),
                "{requested} should be rejected"
            );
        }
        assert!(!handle.is_acquired());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_release_times_out() {
        let store = MemoryLockStore::new();
        let mut holder = lock(&store, "wait");
        let contender = lock(&store, "wait");
        holder.acquire(Capabilities::EXCLUSIVE).await.unwrap();

        let start = Instant::now();
        let outcome = contender.wait_for_release().await.unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_secs(30));

        holder.release().await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_release_sees_absent_row() {
        let store = MemoryLockStore::new();
        let contender = lock(&store, "free");
        let outcome = contender.wait_for_release().await.unwrap();
        assert_eq!(outcome, WaitOutcome::Released);
    }

    #[tokio::test]
    async fn test_release_only_removes_own_row() {
        let store = MemoryLockStore::new();
        let mut first = lock(&store, "stale");
        first.acquire(Capabilities::EXCLUSIVE).await.unwrap();

        // Someone else replaced the row behind our back.
        store.delete(first.name(), first.value()).await.unwrap();
        let mut second = lock(&store, "stale");
        second.acquire(Capabilities::EXCLUSIVE).await.unwrap();

        assert!(first.release().await.unwrap());
        assert!(!first.is_acquired());
        assert_eq!(
            store.holder(second.name()).await.unwrap().as_deref(),
            Some(second.value())
        );

        second.release().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_removes_row_of_cancelled_acquire() {
        let store = SlowAckStore::default();
        let mut handle = slow_ack_lock(&store);

        let cancelled = tokio::time::timeout(
            Duration::from_millis(50),
            handle.acquire(Capabilities::EXCLUSIVE),
        )
        .await;
        assert!(cancelled.is_err());
        assert!(!handle.is_acquired());
        assert_eq!(store.inner.len(), 1);

        drop(handle);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(store.inner.is_empty());

        let mut next = slow_ack_lock(&store);
        assert!(
            next.acquire(Capabilities::EXCLUSIVE | Capabilities::NO_BLOCK)
                .await
                .unwrap()
        );
        next.release().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_removes_row_of_cancelled_acquire() {
        let store = SlowAckStore::default();
        let mut handle = slow_ack_lock(&store);

        let cancelled = tokio::time::timeout(
            Duration::from_millis(50),
            handle.acquire(Capabilities::EXCLUSIVE),
        )
        .await;
        assert!(cancelled.is_err());

        assert!(handle.release().await.unwrap());
        assert!(store.inner.is_empty());
        assert!(handle.release().await.unwrap());
    }

    #[tokio::test]
    async fn test_wait_with_overflowing_ttl() {
        let store = MemoryLockStore::new();
        let options = DatabaseLockOptions {
            ttl: Duration::from_secs(u64::MAX),
            poll_interval: Duration::from_millis(1),
            ..Default::default()
        };
        let mut holder = lock(&store, "forever");
        let mut waiter =
            DatabaseLock::new(store.clone(), "test-namespace", "forever", options).unwrap();
        holder.acquire(Capabilities::EXCLUSIVE).await.unwrap();

        let acquire_task = tokio::spawn(async move {
            let result = waiter.acquire(Capabilities::EXCLUSIVE).await;
            (waiter, result)
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!acquire_task.is_finished());

        holder.release().await.unwrap();
        let (mut waiter, result) = tokio::time::timeout(Duration::from_secs(1), acquire_task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.unwrap());
        waiter.release().await.unwrap();
    }
}
