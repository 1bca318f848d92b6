//! Lock store implementations.

/// Implements the pool accessors, `ensure_schema` and [`LockStore`] for a SQL
/// store struct with `pool` and `statements` fields.
///
/// Every SQL backend shares the same statements shape, so the query code
/// lives here once and only the pool type and dialect vary.
///
/// [`LockStore`]: table_lock_core::store::LockStore
#[cfg(any(feature = "sqlite", feature = "mysql", feature = "postgres"))]
macro_rules! sql_lock_store {
    ($store:ident, $pool:ty, $dialect:expr, $backend:literal) => {
        impl $store {
            /// Wraps an existing pool using the default `lock_table`.
            pub fn new(pool: $pool) -> Self {
                Self {
                    pool,
                    statements: ::std::sync::Arc::new($crate::sql::Statements::for_default_table(
                        $dialect,
                    )),
                }
            }

            /// Wraps an existing pool using a custom table name.
            pub fn with_table(
                pool: $pool,
                table: &str,
            ) -> ::table_lock_core::error::LockResult<Self> {
                Ok(Self {
                    pool,
                    statements: ::std::sync::Arc::new($crate::sql::Statements::new(
                        $dialect, table,
                    )?),
                })
            }

            /// Returns the underlying pool.
            pub fn pool(&self) -> &$pool {
                &self.pool
            }

            /// Creates the lock table and its unique index if they do not exist.
            pub async fn ensure_schema(&self) -> ::table_lock_core::error::LockResult<()> {
                for statement in &self.statements.create {
                    ::sqlx::query(statement)
                        .execute(&self.pool)
                        .await
                        .map_err($crate::store::storage_error)?;
                }
                ::tracing::debug!(backend = $backend, "lock table ready");
                Ok(())
            }
        }

        impl ::table_lock_core::store::LockStore for $store {
            fn backend(&self) -> &'static str {
                $backend
            }

            async fn insert(
                &self,
                record: &::table_lock_core::store::LockRecord,
            ) -> ::table_lock_core::error::LockResult<::table_lock_core::store::InsertOutcome> {
                let result = ::sqlx::query(&self.statements.insert)
                    .bind(&record.name)
                    .bind(&record.value)
                    .bind(record.ttl)
                    .execute(&self.pool)
                    .await;
                $crate::store::insert_outcome(result)
            }

            async fn holder(
                &self,
                name: &str,
            ) -> ::table_lock_core::error::LockResult<Option<String>> {
                ::sqlx::query_scalar::<_, String>(&self.statements.select_holder)
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err($crate::store::storage_error)
            }

            async fn delete(
                &self,
                name: &str,
                value: &str,
            ) -> ::table_lock_core::error::LockResult<u64> {
                let result = ::sqlx::query(&self.statements.delete)
                    .bind(name)
                    .bind(value)
                    .execute(&self.pool)
                    .await
                    .map_err($crate::store::storage_error)?;
                Ok(result.rows_affected())
            }
        }
    };
}

pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryLockStore;
#[cfg(feature = "mysql")]
pub use mysql::MySqlLockStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresLockStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLockStore;

#[cfg(any(feature = "sqlite", feature = "mysql", feature = "postgres"))]
use table_lock_core::error::{LockError, LockResult};
#[cfg(any(feature = "sqlite", feature = "mysql", feature = "postgres"))]
use table_lock_core::store::InsertOutcome;

/// Maps a storage error, separating connectivity failures from the rest.
#[cfg(any(feature = "sqlite", feature = "mysql", feature = "postgres"))]
pub(crate) fn storage_error(e: sqlx::Error) -> LockError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => LockError::Connection(Box::new(e)),
        other => LockError::Backend(Box::new(other)),
    }
}

/// Turns the result of an insert into an [`InsertOutcome`].
///
/// Only a unique-constraint violation counts as a conflict; every other
/// failure propagates.
#[cfg(any(feature = "sqlite", feature = "mysql", feature = "postgres"))]
pub(crate) fn insert_outcome<T>(result: Result<T, sqlx::Error>) -> LockResult<InsertOutcome> {
    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Ok(InsertOutcome::Conflict)
        }
        Err(e) => Err(storage_error(e)),
    }
}
