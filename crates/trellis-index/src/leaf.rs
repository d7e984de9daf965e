//! A leaf index: the physical container of addresses for exactly one
//! concrete type under one label.
//!
//! Composite views over a type and its subtypes are unions of leaves;
//! there is no separate data copy. The container sits behind a read-write
//! lock so cursors handed out earlier can keep reading while later
//! mutations proceed; staleness is detected through the modification
//! counters, never prevented here.

use parking_lot::RwLock;
use std::sync::Arc;

use trellis_core::{Addr, ComparatorRef, IndexKind, TypeCode};

use crate::{bag, set, sorted};

/// One physical index over one concrete type.
pub struct LeafIndex {
    label: String,
    type_code: TypeCode,
    kind: IndexKind,
    comparator: ComparatorRef,
    initial_capacity: usize,
    items: RwLock<Vec<Addr>>,
}

impl LeafIndex {
    pub(crate) fn new(
        label: impl Into<String>,
        type_code: TypeCode,
        kind: IndexKind,
        comparator: ComparatorRef,
        initial_capacity: usize,
    ) -> Self {
        Self {
            label: label.into(),
            type_code,
            kind,
            comparator,
            initial_capacity,
            items: RwLock::new(Vec::with_capacity(initial_capacity)),
        }
    }

    /// The label this leaf was defined under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The concrete type this leaf covers.
    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    /// The duplicate/ordering policy of this index.
    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the leaf holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Insert `fs`. Returns whether the container changed (a set absorbs
    /// an insert whose key is already present).
    pub fn insert(&self, fs: Addr) -> bool {
        let mut items = self.items.write();
        match self.kind {
            IndexKind::Sorted => {
                sorted::insert(self.comparator.as_ref(), &mut items, fs);
                true
            }
            IndexKind::Set => set::insert(self.comparator.as_ref(), &mut items, fs),
            IndexKind::Bag => {
                bag::insert(&mut items, fs);
                true
            }
        }
    }

    /// Remove the entry identity-equal to `fs`. Absence is a no-op;
    /// returns whether the container changed.
    pub fn remove(&self, fs: Addr) -> bool {
        let mut items = self.items.write();
        match self.kind {
            IndexKind::Sorted | IndexKind::Set => {
                sorted::remove(self.comparator.as_ref(), &mut items, fs)
            }
            IndexKind::Bag => bag::remove(&mut items, fs),
        }
    }

    /// Whether some entry matches `fs`: by key for sorted and set
    /// leaves, by address identity for bags.
    pub fn contains(&self, fs: Addr) -> bool {
        self.position_for(fs).is_ok()
    }

    /// Some entry whose key equals `fs`'s key (identity for bags).
    ///
    /// Which of several equal-key entries comes back is unspecified;
    /// callers needing the exact record must refine by address.
    pub fn find(&self, fs: Addr) -> Option<Addr> {
        let items = self.items.read();
        match self.position_for_locked(&items, fs) {
            Ok(pos) => items.get(pos).copied(),
            Err(_) => None,
        }
    }

    /// Position of a matching entry, or the cursor landing position when
    /// absent (`Err` carries the insertion point for ordered leaves and
    /// the end position for bags).
    pub(crate) fn position_for(&self, fs: Addr) -> Result<usize, usize> {
        let items = self.items.read();
        self.position_for_locked(&items, fs)
    }

    fn position_for_locked(&self, items: &[Addr], fs: Addr) -> Result<usize, usize> {
        match self.kind {
            IndexKind::Sorted | IndexKind::Set => {
                sorted::search(self.comparator.as_ref(), items, fs)
            }
            IndexKind::Bag => bag::position_of(items, fs).ok_or(items.len()),
        }
    }

    /// The entry at `pos`, if in bounds.
    pub(crate) fn get(&self, pos: usize) -> Option<Addr> {
        self.items.read().get(pos).copied()
    }

    /// Clear the container. If it grew beyond the initial capacity hint
    /// the backing storage is reallocated at that hint, bounding memory
    /// held after one long-lived burst.
    pub fn flush(&self) {
        let mut items = self.items.write();
        if items.capacity() > self.initial_capacity {
            *items = Vec::with_capacity(self.initial_capacity);
        } else {
            items.clear();
        }
    }
}

impl std::fmt::Debug for LeafIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafIndex")
            .field("label", &self.label)
            .field("type_code", &self.type_code)
            .field("kind", &self.kind)
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

/// A shared handle to a leaf index.
pub type LeafRef = Arc<LeafIndex>;
