//! Core traits for table-backed locks.

use std::future::Future;

use tracing::Instrument;

use crate::capability::Capabilities;
use crate::error::LockResult;

// ============================================================================
// Distributed Lock Trait
// ============================================================================

/// A distributed mutual exclusion lock bound to one subject.
///
/// A lock value is a single acquisition handle: it carries its own holder
/// token and is owned by one task. Dropping an acquired lock schedules a
/// best-effort release; prefer [`DistributedLock::scoped`] or an explicit
/// [`DistributedLock::release`] so release errors can be observed.
///
/// # Example
///
/// ```rust,ignore
/// use table_lock_core::prelude::*;
///
/// let mut lock = provider.create_lock("invoice-42")?;
/// lock.acquire(Capabilities::EXCLUSIVE).await?;
/// // Critical section - we hold the lock
/// do_work().await;
/// lock.release().await?;
/// ```
pub trait DistributedLock: Send {
    /// Capabilities every lock of this type supports.
    fn capabilities() -> Capabilities;

    /// Returns the caller-supplied subject this lock protects.
    fn subject(&self) -> &str;

    /// Returns the derived contention key stored in the backend.
    fn name(&self) -> &str;

    /// Acquires the lock.
    ///
    /// Returns `Ok(true)` once the lock is held, including when this handle
    /// already held it.
    ///
    /// # Errors
    ///
    /// * `LockError::WouldBlock` - `NO_BLOCK` was requested and the lock is held
    /// * `LockError::AcquireFailed` - the wait budget elapsed while the lock stayed held
    /// * `LockError::InsufficientCapability` - the request is not an exclusive lock
    /// * `LockError::Connection` / `LockError::Backend` - storage failed
    fn acquire(
        &mut self,
        capabilities: Capabilities,
    ) -> impl Future<Output = LockResult<bool>> + Send;

    /// Releases the lock if this handle holds it.
    ///
    /// Releasing an unheld lock is a no-op returning `Ok(true)`.
    fn release(&mut self) -> impl Future<Output = LockResult<bool>> + Send;

    /// Releases the lock and consumes the handle.
    fn destroy(self) -> impl Future<Output = LockResult<()>> + Send
    where
        Self: Sized,
    {
        async move {
            let mut this = self;
            this.release().await?;
            Ok(())
        }
    }

    /// Returns whether this handle currently believes it holds the lock.
    ///
    /// Does not consult storage.
    fn is_acquired(&self) -> bool;

    /// Acquires the lock, awaits `f`, then releases the lock.
    ///
    /// The lock is released whether or not `f` succeeded; a release error is
    /// reported after `f` has completed.
    fn scoped<F, Fut, T>(
        &mut self,
        capabilities: Capabilities,
        f: F,
    ) -> impl Future<Output = LockResult<T>> + Send
    where
        Self: Sized,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = T> + Send,
        T: Send,
    {
        async move {
            self.acquire(capabilities).await?;
            let output = f().await;
            self.release().await?;
            Ok(output)
        }
    }
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Factory for creating locks by subject.
///
/// Providers encapsulate backend configuration (store, namespace, TTL),
/// allowing application code to be backend-agnostic. `priority` lets an
/// external selection mechanism choose between several available backends.
pub trait LockProvider: Send + Sync {
    /// The lock type created by this provider.
    type Lock: DistributedLock;

    /// Creates a fresh, unacquired lock handle for `subject`.
    fn create_lock(&self, subject: &str) -> LockResult<Self::Lock>;

    /// Capabilities of the locks this provider creates.
    fn capabilities(&self) -> Capabilities {
        <Self::Lock as DistributedLock>::capabilities()
    }

    /// Selection priority; higher wins.
    fn priority(&self) -> i32;
}

// ============================================================================
// Convenience Extensions
// ============================================================================

/// Extension trait providing convenience methods for lock providers.
pub trait LockProviderExt: LockProvider {
    /// Runs `f` while holding the lock for `subject`.
    ///
    /// Convenience method combining `create_lock` and `scoped`.
    fn with_lock<F, Fut, T>(
        &self,
        subject: &str,
        capabilities: Capabilities,
        f: F,
    ) -> impl Future<Output = LockResult<T>> + Send
    where
        Self: Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = T> + Send,
        T: Send,
    {
        let span = tracing::debug_span!("with_lock", lock.subject = %subject);
        async move {
            let mut lock = self.create_lock(subject)?;
            lock.scoped(capabilities, f).await
        }
        .instrument(span)
    }

    /// Makes a single non-blocking attempt for `subject`.
    ///
    /// Returns `Ok(None)` when another holder has the lock.
    fn try_acquire_lock(
        &self,
        subject: &str,
    ) -> impl Future<Output = LockResult<Option<Self::Lock>>> + Send
    where
        Self: Sync,
    {
        async move {
            let mut lock = self.create_lock(subject)?;
            match lock
                .acquire(Capabilities::EXCLUSIVE | Capabilities::NO_BLOCK)
                .await
            {
                Ok(_) => Ok(Some(lock)),
                Err(crate::error::LockError::WouldBlock { .. }) => Ok(None),
                Err(e) => Err(e),
            }
        }
    }
}

// Blanket implementation for all LockProviders
impl<T: LockProvider> LockProviderExt for T {}
