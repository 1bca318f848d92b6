//! Storage contract for table-backed locks.

use std::future::Future;

use crate::error::LockResult;

/// A single row of the lock table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    /// Contention key.
    pub name: String,
    /// Holder token of the handle that inserted the row.
    pub value: String,
    /// Advisory lifetime in seconds.
    pub ttl: i64,
}

/// Outcome of inserting a lock row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written; the inserter now holds the lock.
    Inserted,
    /// A row with the same name already exists.
    Conflict,
}

/// Storage backing a table lock.
///
/// Implementations must guarantee that two concurrent inserts for the same
/// `name` cannot both report [`InsertOutcome::Inserted`]. Errors other than
/// the uniqueness conflict are returned as-is and never masked.
///
/// Stores are cheap handles (typically a connection pool) and are cloned
/// into every lock they back.
pub trait LockStore: Clone + Send + Sync + 'static {
    /// Short backend label used in diagnostics.
    fn backend(&self) -> &'static str;

    /// Inserts `record`, reporting a conflict instead of failing.
    fn insert(&self, record: &LockRecord) -> impl Future<Output = LockResult<InsertOutcome>> + Send;

    /// Returns the holder token for `name`, if a row exists.
    fn holder(&self, name: &str) -> impl Future<Output = LockResult<Option<String>>> + Send;

    /// Deletes the row for `name` if it is still held by `value`.
    ///
    /// Returns the number of rows removed. Deleting an absent row is not an error.
    fn delete(&self, name: &str, value: &str) -> impl Future<Output = LockResult<u64>> + Send;
}
