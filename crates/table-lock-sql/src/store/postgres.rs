//! PostgreSQL lock store.

use std::sync::Arc;

use sqlx::PgPool;
use table_lock_core::error::{LockError, LockResult};

use crate::sql::{Dialect, Statements};

/// Lock store backed by a PostgreSQL table.
///
/// Holding a lock does not pin a connection the way advisory locks do; the
/// row outlives the session that inserted it.
///
/// Inserts run outside explicit transactions, so a unique violation never
/// aborts surrounding work.
#[derive(Debug, Clone)]
pub struct PostgresLockStore {
    pool: PgPool,
    statements: Arc<Statements>,
}

sql_lock_store!(PostgresLockStore, PgPool, Dialect::Postgres, "postgres");

impl PostgresLockStore {
    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> LockResult<Self> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| LockError::Connection(Box::new(e)))?;
        Ok(Self::new(pool))
    }
}
