//! Interned string handle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle into a [`StringInterner`](crate::StringInterner).
///
/// Handle 0 is the empty string. It doubles as the "no string" value, so
/// interning `""` never allocates a slot.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The reserved empty string.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Name::EMPTY")
        } else {
            write!(f, "Name({})", self.0)
        }
    }
}
