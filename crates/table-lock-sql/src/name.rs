//! Lock name derivation.
//!
//! A lock name scopes the caller's subject to one deployment: two
//! applications sharing a lock table but configured with different namespace
//! secrets never contend on the same row.
//!
//! Names are bounded by the width of the `name` column. Subjects that would
//! overflow it are shortened and suffixed with a hash of the full subject.

use sha2::{Digest, Sha256};
use table_lock_core::error::{LockError, LockResult};

/// Maximum length of a stored lock name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Tag mixed into the namespace hash.
const NAMESPACE_TAG: &str = ":DATABASE_LOCKING";

/// Separator between the namespace hash and the subject.
const NAME_INFIX: &str = ":lock:name:";

/// Derives the stored lock name for `subject` under `namespace`.
///
/// The result is `hex(sha256(namespace + ":DATABASE_LOCKING")) + ":lock:name:" + subject`,
/// with the subject shortened when the whole would exceed [`MAX_NAME_LENGTH`].
pub fn derive_lock_name(namespace: &str, subject: &str) -> LockResult<String> {
    if subject.is_empty() {
        return Err(LockError::InvalidName(
            "lock subject cannot be empty".to_string(),
        ));
    }

    let prefix = format!("{}{}", namespace_hash(namespace), NAME_INFIX);
    let budget = MAX_NAME_LENGTH - prefix.len();
    Ok(format!("{}{}", prefix, to_safe_subject(subject, budget)))
}

/// Hex SHA-256 of the tagged namespace.
fn namespace_hash(namespace: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(NAMESPACE_TAG.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fits `subject` into `max_len` bytes.
///
/// Short subjects pass through untouched. Longer ones keep as much of their
/// leading text as fits in front of the hex SHA-256 of the whole subject.
fn to_safe_subject(subject: &str, max_len: usize) -> String {
    if subject.len() <= max_len {
        return subject.to_string();
    }

    let mut hasher = Sha256::new();
    hasher.update(subject.as_bytes());
    let subject_hash = format!("{:x}", hasher.finalize());

    if subject_hash.len() >= max_len {
        return subject_hash[..max_len].to_string();
    }

    let prefix_budget = max_len - subject_hash.len();
    let mut prefix_end = 0;
    for (index, ch) in subject.char_indices() {
        let end = index + ch.len_utf8();
        if end > prefix_budget {
            break;
        }
        prefix_end = end;
    }

    format!("{}{}", &subject[..prefix_end], subject_hash)
}
