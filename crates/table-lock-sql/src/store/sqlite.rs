//! SQLite lock store.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use table_lock_core::error::{LockError, LockResult};

use crate::sql::{Dialect, Statements};

/// Lock store backed by a SQLite database file.
///
/// Suitable for processes sharing one host or one filesystem. Every process
/// must open the same database file.
#[derive(Debug, Clone)]
pub struct SqliteLockStore {
    pool: SqlitePool,
    statements: Arc<Statements>,
}

sql_lock_store!(SqliteLockStore, SqlitePool, Dialect::Sqlite, "sqlite");

impl SqliteLockStore {
    /// Opens (creating if missing) the database at `url`.
    ///
    /// Connections wait on a busy database instead of failing immediately,
    /// since lock traffic is write-heavy.
    pub async fn connect(url: &str) -> LockResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| LockError::InvalidConfiguration(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| LockError::Connection(Box::new(e)))?;

        Ok(Self::new(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_lock_core::store::{InsertOutcome, LockRecord, LockStore};

    async fn memory_store() -> SqliteLockStore {
        // One connection keeps every query on the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteLockStore::new(pool);
        store.ensure_schema().await.unwrap();
        store
    }

    fn record(name: &str, value: &str) -> LockRecord {
        LockRecord {
            name: name.to_string(),
            value: value.to_string(),
            ttl: 30,
        }
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let store = memory_store().await;
        store.ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_unique_violation_is_conflict() {
        let store = memory_store().await;
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
    async fn test_delete_is_value_qualified() {
        let store = memory_store().await;
        store.insert(&record("k", "a")).await.unwrap();

        assert_eq!(store.delete("k", "b").await.unwrap(), 0);
        assert_eq!(store.delete("k", "a").await.unwrap(), 1);
        assert_eq!(store.holder("k").await.unwrap(), None);
        assert_eq!(store.delete("k", "a").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ttl_is_persisted() {
        let store = memory_store().await;
        store.insert(&record("k", "a")).await.unwrap();

        let ttl: i64 = sqlx::query_scalar("SELECT ttl FROM lock_table WHERE name = ?")
            .bind("k")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(ttl, 30);
    }

    #[tokio::test]
    async fn test_missing_table_is_backend_error() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteLockStore::with_table(pool, "missing_locks").unwrap();

        let err = store.insert(&record("k", "a")).await.unwrap_err();
        assert!(matches!(err, LockError::Backend(_)));
    }

    #[tokio::test]
    async fn test_custom_table_name_is_validated() {
        let pool = SqlitePoolOptions::new()
            .connect_lazy("sqlite::memory:")
            .unwrap();
        let err = SqliteLockStore::with_table(pool, "bad name").unwrap_err();
        assert!(matches!(err, LockError::InvalidName(_)));
    }
}
