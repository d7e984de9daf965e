//! Strong type definitions for Trellis.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The address of one feature structure within a store instance.
///
/// An address is opaque and stable for the lifetime of its store. Equality
/// of addresses is record identity: two distinct records may compare equal
/// under an index comparator ("same key") while having different addresses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Addr(pub u32);

impl Addr {
    /// Create an address from its raw value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub const fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr({})", self.0)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<u32> for Addr {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// The code of a concrete type in the committed type lattice.
///
/// Codes are assigned in depth-first preorder over the lattice, so the
/// subtree rooted at any type occupies a contiguous code range. Composite
/// index views rely on this to enumerate a type and all its subtypes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeCode(pub u32);

impl TypeCode {
    /// Create a type code from its raw value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub const fn as_raw(&self) -> u32 {
        self.0
    }

    /// The raw value as a table index.
    pub const fn as_index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeCode({})", self.0)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl From<u32> for TypeCode {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// The duplicate-handling and ordering policy of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    /// Fully sorted under the comparator; duplicate keys permitted.
    Sorted,
    /// Sorted, at most one entry per distinct comparator key.
    Set,
    /// Unordered multiset; iteration order is insertion order.
    Bag,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndexKind::Sorted => "sorted",
            IndexKind::Set => "set",
            IndexKind::Bag => "bag",
        };
        f.write_str(s)
    }
}
