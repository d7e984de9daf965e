//! Proptest generators for property-based testing.

use proptest::prelude::*;

use trellis_core::IndexKind;

/// Generate an index kind.
pub fn index_kind() -> impl Strategy<Value = IndexKind> {
    prop_oneof![
        Just(IndexKind::Sorted),
        Just(IndexKind::Set),
        Just(IndexKind::Bag),
    ]
}

/// Generate a record key within a small range, so duplicate keys are
/// common and the equal-key paths get exercised.
pub fn record_key() -> impl Strategy<Value = i64> {
    -8i64..=8
}

/// One step of an index workload.
#[derive(Debug, Clone)]
pub enum IndexOp {
    /// Create a record with this key and index it.
    Insert(i64),
    /// Remove the n-th live record (modulo the live count).
    Remove(usize),
}

/// Generate a workload of interleaved inserts and removals.
pub fn index_ops(max_len: usize) -> impl Strategy<Value = Vec<IndexOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => record_key().prop_map(IndexOp::Insert),
            1 => (0usize..32).prop_map(IndexOp::Remove),
        ],
        0..=max_len,
    )
}
