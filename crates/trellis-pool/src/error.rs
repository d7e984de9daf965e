//! Error types for pools and the store manager.
//!
//! Capacity errors (exhaustion) are recoverable: callers retry or back
//! off outside this crate. Ownership errors (wrong pool, wrong manager,
//! double definition) are programming errors and carry enough identity
//! to name the offender.

use thiserror::Error;
use trellis_store::StoreError;

/// Errors raised by pool and manager operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// All instances of the requestor's pool are checked out.
    #[error(
        "store pool for {requestor:?} is exhausted: {size} instances defined, {available} available"
    )]
    Exhausted {
        requestor: String,
        size: usize,
        available: usize,
    },

    /// No pool was ever defined for this requestor, distinct from
    /// exhaustion.
    #[error(
        "no store pool configured for {requestor:?}: requested {requested}, available {available}"
    )]
    NoPoolConfigured {
        requestor: String,
        requested: usize,
        available: usize,
    },

    /// The instance is not owned by the pool it was released to.
    #[error("instance released to pool {requestor:?}, which does not own it")]
    ReleasedToWrongPool { requestor: String },

    /// The instance was released to a manager that never issued it.
    #[error("instance released to a manager that never issued it")]
    WrongManager,

    /// A pool for this requestor identity already exists.
    #[error("store pool for {requestor:?} is already defined")]
    PoolAlreadyDefined { requestor: String },

    /// Building a store instance or the merged definition failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for pool and manager operations.
pub type Result<T> = std::result::Result<T, PoolError>;
