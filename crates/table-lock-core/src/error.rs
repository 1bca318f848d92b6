//! Error types for table lock operations.

use std::time::Duration;
use thiserror::Error;

use crate::capability::Capabilities;

/// Errors that can occur during lock operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// A non-blocking acquire found the lock held by another holder.
    #[error("lock '{name}' is held by another holder")]
    WouldBlock { name: String },

    /// A blocking acquire exhausted its wait budget.
    #[error("failed to acquire lock '{name}' after waiting {waited:?}")]
    AcquireFailed { name: String, waited: Duration },

    /// The caller asked for something this backend cannot provide.
    #[error("requested capabilities {requested} are not supported (supported: {supported})")]
    InsufficientCapability {
        requested: Capabilities,
        supported: Capabilities,
    },

    /// Invalid lock subject or storage identifier.
    #[error("invalid lock name: {0}")]
    InvalidName(String),

    /// Provider or store was configured incompletely.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Storage connection failed.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Storage error other than the expected uniqueness conflict.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LockError {
    /// Returns true for contention outcomes a caller may retry later.
    pub fn is_contention(&self) -> bool {
        matches!(self, Self::WouldBlock { .. } | Self::AcquireFailed { .. })
    }
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
