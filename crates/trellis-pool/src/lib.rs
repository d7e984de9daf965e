//! # Trellis Pool
//!
//! Bounded pools of store instances and the [`StoreManager`] that owns
//! them.
//!
//! Store instances are scarce and expensive to construct, so each
//! requestor (pipeline stage) gets a fixed-size [`StorePool`] defined
//! once up front. The manager tracks ownership strictly (an instance
//! can only ever be released to the pool that issued it) and keeps the
//! merged [`StoreDefinition`] and the materialized type system in a pair
//! of caches that invalidate together whenever new component metadata is
//! registered.
//!
//! Acquire never blocks: it returns an instance or an error immediately.
//! Callers needing backpressure layer a queue or backoff policy on top.
//!
//! [`StoreDefinition`]: trellis_store::StoreDefinition

pub mod error;
pub mod manager;
pub mod pool;
pub mod sizing;

pub use error::{PoolError, Result};
pub use manager::StoreManager;
pub use pool::StorePool;
pub use sizing::{IdentitySizing, SizingPolicy};
