//! Distributed mutual exclusion locks backed by a relational table.
//!
//! Independent processes that share a database, but no coordination service,
//! can use this crate to agree on "who holds lock X right now". A lock is a
//! row in a shared table; the table's unique index on the lock name is the
//! single arbiter under contention.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use table_lock::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open the shared database and make sure the lock table exists
//!     let store = SqliteLockStore::connect("sqlite:/var/lib/app/locks.db").await?;
//!     store.ensure_schema().await?;
//!
//!     // Every process contending on the same locks uses the same namespace
//!     let provider = TableLockProvider::new(store, "app-secret")?;
//!
//!     // Run the critical section while holding the lock
//!     provider
//!         .with_lock("nightly-report", Capabilities::EXCLUSIVE, || async {
//!             println!("Doing critical work...");
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Acquisition modes
//!
//! - `Capabilities::EXCLUSIVE` waits for a held lock, for up to the TTL
//!   (minimum one second) per wait, then fails with `LockError::AcquireFailed`.
//! - `Capabilities::EXCLUSIVE | Capabilities::NO_BLOCK` makes a single attempt
//!   and fails with `LockError::WouldBlock` if the lock is held.
//! - Shared locking is not supported and fails with
//!   `LockError::InsufficientCapability`.
//!
//! # Backends
//!
//! - [`SqliteLockStore`] for processes sharing a host or filesystem
//! - [`MySqlLockStore`] for MySQL and MariaDB
//! - [`PostgresLockStore`] for PostgreSQL
//! - [`MemoryLockStore`] for tests and single-process use
//!
//! # TTL
//!
//! The TTL is recorded with each row but never enforced: rows of crashed
//! holders stay until removed externally.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `table-lock-core`: Core traits and types
//! - `table-lock-sql`: Table-backed lock, provider and stores

// Re-export core types and traits
pub use table_lock_core::*;

// Re-export the table backend
pub use table_lock_sql::{
    DatabaseLock, DatabaseLockOptions, MemoryLockStore, TableLockProvider,
    TableLockProviderBuilder, name, options, sql,
};
#[cfg(feature = "mysql")]
pub use table_lock_sql::MySqlLockStore;
#[cfg(feature = "postgres")]
pub use table_lock_sql::PostgresLockStore;
#[cfg(feature = "sqlite")]
pub use table_lock_sql::SqliteLockStore;
