//! A fixed-capacity pool of store instances for one requestor.
//!
//! Membership is fixed at construction: an instance belongs to exactly
//! one pool for its entire lifetime and the capacity never grows.
//! Acquire and release are the only genuinely shared operations in the
//! system and are linearizable through the free-list lock; acquire never
//! blocks; it succeeds or fails immediately, and backpressure belongs
//! to the caller.

use parking_lot::Mutex;
use std::sync::Arc;

use tracing::{trace, warn};
use trellis_store::Store;

use crate::error::{PoolError, Result};

/// A fixed-size pool of interchangeable store instances.
pub struct StorePool {
    requestor: String,
    instances: Vec<Arc<Store>>,
    free: Mutex<Vec<Arc<Store>>>,
}

impl StorePool {
    pub(crate) fn new(requestor: impl Into<String>, instances: Vec<Arc<Store>>) -> Self {
        let free = instances.clone();
        Self {
            requestor: requestor.into(),
            instances,
            free: Mutex::new(free),
        }
    }

    /// The requestor identity this pool was defined for.
    pub fn requestor(&self) -> &str {
        &self.requestor
    }

    /// Configured pool capacity.
    pub fn size(&self) -> usize {
        self.instances.len()
    }

    /// Number of instances currently available.
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    /// Whether this pool owns `instance`.
    pub fn owns(&self, instance: &Arc<Store>) -> bool {
        self.instances.iter().any(|i| Arc::ptr_eq(i, instance))
    }

    /// All member instances, available or not.
    pub(crate) fn instances(&self) -> &[Arc<Store>] {
        &self.instances
    }

    /// Check out an instance, or fail immediately when none is free.
    pub fn acquire(&self) -> Result<Arc<Store>> {
        match self.free.lock().pop() {
            Some(instance) => {
                trace!(requestor = %self.requestor, "store instance acquired");
                Ok(instance)
            }
            None => Err(PoolError::Exhausted {
                requestor: self.requestor.clone(),
                size: self.size(),
                available: 0,
            }),
        }
    }

    /// Return an instance to this pool.
    ///
    /// The instance is reset before it becomes available again, so the
    /// next acquirer gets a clean store. Releasing an instance the pool
    /// does not own is an error; releasing one that is already available
    /// is logged and ignored.
    pub fn release(&self, instance: &Arc<Store>) -> Result<()> {
        if !self.owns(instance) {
            return Err(PoolError::ReleasedToWrongPool {
                requestor: self.requestor.clone(),
            });
        }
        instance.reset();
        let mut free = self.free.lock();
        if free.iter().any(|i| Arc::ptr_eq(i, instance)) {
            warn!(
                requestor = %self.requestor,
                "store instance released twice; ignoring"
            );
            return Ok(());
        }
        free.push(instance.clone());
        trace!(requestor = %self.requestor, "store instance released");
        Ok(())
    }
}

impl std::fmt::Debug for StorePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorePool")
            .field("requestor", &self.requestor)
            .field("size", &self.size())
            .field("available", &self.available())
            .finish()
    }
}
