//! In-process lock store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use table_lock_core::error::LockResult;
use table_lock_core::store::{InsertOutcome, LockRecord, LockStore};

/// A lock table kept in process memory.
///
/// Clones share the same table, so handles created from clones contend with
/// each other exactly as they would through a database. Useful for tests and
/// for deployments that only need cross-task exclusion inside one process.
#[derive(Debug, Clone, Default)]
pub struct MemoryLockStore {
    rows: Arc<Mutex<HashMap<String, LockRecord>>>,
}

impl MemoryLockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    /// Returns a copy of the row for `name`.
    pub fn get(&self, name: &str) -> Option<LockRecord> {
        self.rows().get(name).cloned()
    }

    fn rows(&self) -> MutexGuard<'_, HashMap<String, LockRecord>> {
        // A panic while holding the guard cannot leave a half-written row.
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LockStore for MemoryLockStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: &LockRecord) -> LockResult<InsertOutcome> {
        let mut rows = self.rows();
        if rows.contains_key(&record.name) {
            return Ok(InsertOutcome::Conflict);
        }
        rows.insert(record.name.clone(), record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn holder(&self, name: &str) -> LockResult<Option<String>> {
        Ok(self.rows().get(name).map(|row| row.value.clone()))
    }

    async fn delete(&self, name: &str, value: &str) -> LockResult<u64> {
        let mut rows = self.rows();
        match rows.get(name) {
            Some(row) if row.value == value => {
                rows.remove(name);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, value: &str) -> LockRecord {
        LockRecord {
            name: name.to_string(),
            value: value.to_string(),
            ttl: 30,
        }
    }

    #[tokio::test]
    async fn test_insert_conflicts_on_name() {
        let store = MemoryLockStore::new();
        assert_eq!(
            store.insert(&record("k", "a")).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert(&record("k", "b")).await.unwrap(),
            InsertOutcome::Conflict
        );
        assert_eq!(store.holder("k").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_delete_requires_matching_value() {
        let store = MemoryLockStore::new();
        store.insert(&record("k", "a")).await.unwrap();

        assert_eq!(store.delete("k", "b").await.unwrap(), 0);
        assert_eq!(store.len(), 1);

        assert_eq!(store.delete("k", "a").await.unwrap(), 1);
        assert!(store.is_empty());

        assert_eq!(store.delete("k", "a").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_rows() {
        let store = MemoryLockStore::new();
        let clone = store.clone();
        store.insert(&record("k", "a")).await.unwrap();
        assert_eq!(clone.get("k"), Some(record("k", "a")));
    }
}
