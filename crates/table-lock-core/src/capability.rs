//! Lock capability flags.
//!
//! A caller describes what kind of lock it wants as a set of flags. Backends
//! advertise the set they support and reject anything outside it.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of lock capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// Shared (reader) locking.
    pub const SHARED: Self = Self(1 << 0);
    /// Exclusive (writer) locking.
    pub const EXCLUSIVE: Self = Self(1 << 1);
    /// Fail immediately instead of waiting for a held lock.
    pub const NO_BLOCK: Self = Self(1 << 2);

    const ALL: [(Self, &'static str); 3] = [
        (Self::SHARED, "SHARED"),
        (Self::EXCLUSIVE, "EXCLUSIVE"),
        (Self::NO_BLOCK, "NO_BLOCK"),
    ];

    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from raw bits. Unknown bits are kept so they can be rejected.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if the caller asked not to wait for a held lock.
    pub const fn is_non_blocking(self) -> bool {
        self.contains(Self::NO_BLOCK)
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(empty)");
        }

        let mut remaining = self.0;
        let mut first = true;
        for (flag, label) in Self::ALL {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(label)?;
                remaining &= !flag.0;
                first = false;
            }
        }
        if remaining != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{remaining:#04x}")?;
        }
        Ok(())
    }
}
