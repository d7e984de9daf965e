//! Error types for the index engine.

use thiserror::Error;
use trellis_core::{Addr, TypeCode};

/// Errors raised by index definition and repository operations.
///
/// Removing or looking up an absent record is never an error; those are
/// defined no-ops and negative results.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index {label:?} already defined with a different type, kind, or comparator")]
    IncompatibleDefinition { label: String },

    #[error("no index defined with label {0:?}")]
    UnknownIndex(String),

    #[error("index {label:?} covers type {declared}; cannot narrow to unrelated type {requested}")]
    TypeMismatch {
        label: String,
        declared: TypeCode,
        requested: TypeCode,
    },

    #[error("unknown type code {0}")]
    UnknownType(TypeCode),

    #[error("record {0} is not registered with this store")]
    UnknownRecord(Addr),
}
