//! Error types for Trellis core primitives.

use thiserror::Error;

/// Errors raised while building or querying the committed type lattice.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown type: {0:?}")]
    UnknownType(String),

    #[error("type {name:?} declared twice with different parents: {first:?} and {second:?}")]
    ConflictingParents {
        name: String,
        first: Option<String>,
        second: Option<String>,
    },

    #[error("type {name:?} names unknown parent {parent:?}")]
    UnknownParent { name: String, parent: String },

    #[error("no root type declared")]
    NoRoot,

    #[error("more than one root type declared: {first:?} and {second:?}")]
    MultipleRoots { first: String, second: String },

    #[error("type {0:?} is not reachable from the root")]
    UnreachableType(String),
}
