//! Table lock provider implementation.

use std::time::Duration;

use table_lock_core::error::{LockError, LockResult};
use table_lock_core::store::LockStore;
use table_lock_core::traits::LockProvider;

use crate::lock::DatabaseLock;
use crate::options::DatabaseLockOptions;

/// Builder for table lock provider configuration.
pub struct TableLockProviderBuilder<S: LockStore> {
    store: Option<S>,
    namespace: Option<String>,
    options: DatabaseLockOptions,
}

impl<S: LockStore> TableLockProviderBuilder<S> {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            store: None,
            namespace: None,
            options: DatabaseLockOptions::default(),
        }
    }

    /// Sets the store holding the lock table.
    pub fn store(mut self, store: S) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the namespace secret that scopes lock names to this deployment.
    ///
    /// Every process that must contend on the same locks has to use the same
    /// namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Replaces all timing and priority options at once.
    pub fn options(mut self, options: DatabaseLockOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the advisory TTL, which is also the per-wait budget.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.options.ttl = ttl;
        self
    }

    /// Sets the delay between holder probes while waiting.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self
    }

    /// Sets the backend selection priority.
    pub fn priority(mut self, priority: i32) -> Self {
        self.options.priority = priority;
        self
    }

    /// Builds the provider.
    ///
    /// # Errors
    ///
    /// Returns `LockError::InvalidConfiguration` if no store or namespace was
    /// specified, or if the poll interval is zero.
    pub fn build(self) -> LockResult<TableLockProvider<S>> {
        let store = self
            .store
            .ok_or_else(|| LockError::InvalidConfiguration("store not specified".to_string()))?;
        let namespace = self.namespace.ok_or_else(|| {
            LockError::InvalidConfiguration("namespace not specified".to_string())
        })?;
        if self.options.poll_interval.is_zero() {
            return Err(LockError::InvalidConfiguration(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        Ok(TableLockProvider {
            store,
            namespace,
            options: self.options,
        })
    }
}

impl<S: LockStore> Default for TableLockProviderBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider for table-backed distributed locks.
///
/// Every call to `create_lock` returns a fresh handle with its own holder
/// token; handles for the same subject contend through the store.
#[derive(Debug, Clone)]
pub struct TableLockProvider<S: LockStore> {
    store: S,
    namespace: String,
    options: DatabaseLockOptions,
}

impl<S: LockStore> TableLockProvider<S> {
    /// Returns a new builder for configuring the provider.
    pub fn builder() -> TableLockProviderBuilder<S> {
        TableLockProviderBuilder::new()
    }

    /// Creates a provider with default options.
    pub fn new(store: S, namespace: impl Into<String>) -> LockResult<Self> {
        Self::builder().store(store).namespace(namespace).build()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &DatabaseLockOptions {
        &self.options
    }
}

impl<S: LockStore> LockProvider for TableLockProvider<S> {
    type Lock = DatabaseLock<S>;

    fn create_lock(&self, subject: &str) -> LockResult<Self::Lock> {
        DatabaseLock::new(
            self.store.clone(),
            &self.namespace,
            subject,
            self.options.clone(),
        )
    }

    fn priority(&self) -> i32 {
        self.options.priority
    }
}
