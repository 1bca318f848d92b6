//! Store wrapper that counts the operations reaching storage.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use table_lock::{InsertOutcome, LockRecord, LockResult, LockStore};

/// Wraps a store and counts inserts, holder lookups and deletes.
#[derive(Debug, Clone)]
pub struct CountingStore<S> {
    inner: S,
    inserts: Arc<AtomicUsize>,
    lookups: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
}

impl<S: LockStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            inserts: Arc::new(AtomicUsize::new(0)),
            lookups: Arc::new(AtomicUsize::new(0)),
            deletes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Total operations of any kind.
    pub fn calls(&self) -> usize {
        self.inserts() + self.lookups.load(Ordering::SeqCst) + self.deletes()
    }
}

impl<S: LockStore> LockStore for CountingStore<S> {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn insert(&self, record: &LockRecord) -> LockResult<InsertOutcome> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(record).await
    }

    async fn holder(&self, name: &str) -> LockResult<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.holder(name).await
    }

    async fn delete(&self, name: &str, value: &str) -> LockResult<u64> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(name, value).await
    }
}
