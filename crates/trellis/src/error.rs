//! Error types for the unified Trellis API.

use thiserror::Error;
use trellis_core::CoreError;
use trellis_index::IndexError;
use trellis_pool::PoolError;
use trellis_store::StoreError;

/// Errors that can occur across the Trellis subsystems.
#[derive(Debug, Error)]
pub enum TrellisError {
    /// Type system error.
    #[error("type system error: {0}")]
    Core(#[from] CoreError),

    /// Index engine error.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Store instance error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Pool or manager error.
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Result type for Trellis operations.
pub type Result<T> = std::result::Result<T, TrellisError>;
