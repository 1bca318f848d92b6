//! MySQL lock store.

use std::sync::Arc;

use sqlx::MySqlPool;
use table_lock_core::error::{LockError, LockResult};

use crate::sql::{Dialect, Statements};

/// Lock store backed by a MySQL (or MariaDB) table.
///
/// Unlike `GET_LOCK`, holding a table lock does not pin a connection: the
/// row outlives the connection that inserted it, so a pool of any size works.
///
/// Lock names are compared byte for byte (`utf8mb4_bin`), whatever the
/// server's default collation.
#[derive(Debug, Clone)]
pub struct MySqlLockStore {
    pool: MySqlPool,
    statements: Arc<Statements>,
}

sql_lock_store!(MySqlLockStore, MySqlPool, Dialect::MySql, "mysql");

impl MySqlLockStore {
    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> LockResult<Self> {
        let pool = MySqlPool::connect(url)
            .await
            .map_err(|e| LockError::Connection(Box::new(e)))?;
        Ok(Self::new(pool))
    }
}
