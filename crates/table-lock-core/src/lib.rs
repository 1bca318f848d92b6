//! Core traits and types for table-backed distributed locks.

pub mod capability;
pub mod error;
pub mod prelude;
pub mod store;
pub mod traits;

pub use capability::Capabilities;
pub use error::{LockError, LockResult};
pub use prelude::*;
