//! Convenience prelude for table lock types.

pub use crate::capability::Capabilities;
pub use crate::error::{LockError, LockResult};
pub use crate::store::{InsertOutcome, LockRecord, LockStore};
pub use crate::traits::{DistributedLock, LockProvider, LockProviderExt};
