//! The shared modification-counter block.
//!
//! One counter per type code, owned by an [`IndexRepository`] and shared
//! by reference with every cursor it hands out. Cursors hold a snapshot
//! value, never a private copy of the block; staleness detection depends
//! on reading the live counter.
//!
//! [`IndexRepository`]: crate::repository::IndexRepository

use std::sync::atomic::{AtomicU64, Ordering};

use trellis_core::TypeCode;

/// Per-type modification counters.
///
/// A counter is bumped once per structural mutation (insert or remove)
/// affecting any index of that type, and every counter is bumped on a
/// repository flush so all outstanding cursors read as stale.
#[derive(Debug)]
pub struct ModCounters {
    counts: Vec<AtomicU64>,
}

impl ModCounters {
    /// Create a counter block covering `type_count` type codes.
    pub fn new(type_count: usize) -> Self {
        let mut counts = Vec::with_capacity(type_count);
        counts.resize_with(type_count, || AtomicU64::new(0));
        Self { counts }
    }

    /// Record a structural mutation to indices of type `t`.
    pub fn bump(&self, t: TypeCode) {
        if let Some(c) = self.counts.get(t.as_index()) {
            c.fetch_add(1, Ordering::Release);
        }
    }

    /// Invalidate every outstanding cursor (store reset / flush).
    pub fn bump_all(&self) {
        for c in &self.counts {
            c.fetch_add(1, Ordering::Release);
        }
    }

    /// The live counter value for type `t`.
    pub fn get(&self, t: TypeCode) -> u64 {
        self.counts
            .get(t.as_index())
            .map(|c| c.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    /// Number of type codes covered.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the block covers no types.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
