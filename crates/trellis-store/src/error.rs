//! Error types for the store instance layer.

use thiserror::Error;
use trellis_core::{CoreError, TypeCode};
use trellis_index::IndexError;

/// Errors raised while building definitions or operating a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Type system error (merge conflict, unknown type name).
    #[error("type system error: {0}")]
    Core(#[from] CoreError),

    /// Index engine error.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Two components declared the same index label incompatibly.
    #[error("index {label:?} declared twice with conflicting definitions")]
    ConflictingIndex { label: String },

    /// A record was created with a type code outside the lattice.
    #[error("type code {0} is not in the committed type system")]
    UnknownTypeCode(TypeCode),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
