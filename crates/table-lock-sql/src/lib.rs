//! Relational table backend for distributed locks.
//!
//! A lock is held while a row keyed by the lock's name exists in a shared
//! table. Acquisition inserts the row and relies on a unique index over the
//! name to reject concurrent holders; release deletes the row, qualified by
//! the holder token so one handle can never evict another.
//!
//! The `ttl` column is advisory: nothing expires rows automatically. A holder
//! that crashes without releasing leaves its row until an operator or an
//! external reaper removes it. The TTL also bounds how long a blocking
//! acquire waits for a release before giving up.

pub mod lock;
pub mod name;
pub mod options;
pub mod provider;
pub mod sql;
pub mod store;

pub use lock::DatabaseLock;
pub use options::DatabaseLockOptions;
pub use provider::{TableLockProvider, TableLockProviderBuilder};
pub use store::MemoryLockStore;
#[cfg(feature = "mysql")]
pub use store::MySqlLockStore;
#[cfg(feature = "postgres")]
pub use store::PostgresLockStore;
#[cfg(feature = "sqlite")]
pub use store::SqliteLockStore;
