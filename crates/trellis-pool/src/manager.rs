//! The store manager: one pool per requestor, the reverse ownership map,
//! and the lazily-built, invalidate-on-write definition caches.
//!
//! The manager owns two caches that must stay consistent with each
//! other: the merged [`StoreDefinition`] and the materialized "current
//! type system". Registering new component metadata invalidates both in
//! lockstep; each rebuilds lazily on next use. The reverse ownership map
//! (instance -> pool) is populated once at pool definition time and only
//! consulted afterwards, so pools stay independently constructible
//! without instances carrying back-pointers.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use trellis_core::{ComponentMetadata, TypeLattice};
use trellis_store::{Store, StoreDefinition, TuningConfig};

use crate::error::{PoolError, Result};
use crate::pool::StorePool;
use crate::sizing::{IdentitySizing, SizingPolicy};

/// Stable identity key of a store instance handle.
fn instance_key(instance: &Arc<Store>) -> usize {
    Arc::as_ptr(instance) as usize
}

/// Owns the per-requestor pools and the shared definition caches.
pub struct StoreManager {
    metadata: Mutex<Vec<ComponentMetadata>>,
    /// Lazily built merged definition; `None` means stale.
    definition: Mutex<Option<Arc<StoreDefinition>>>,
    /// The type system materialized from the current definition; always
    /// invalidated together with it.
    type_system: Mutex<Option<Arc<TypeLattice>>>,
    pools: Mutex<HashMap<String, Arc<StorePool>>>,
    /// Reverse ownership map: instance identity -> owning pool.
    owner_of: Mutex<HashMap<usize, Arc<StorePool>>>,
    sizing: Box<dyn SizingPolicy>,
}

impl StoreManager {
    /// A manager with the identity sizing policy.
    pub fn new() -> Self {
        Self::with_sizing(IdentitySizing)
    }

    /// A manager with a custom pool sizing policy.
    pub fn with_sizing(sizing: impl SizingPolicy + 'static) -> Self {
        Self {
            metadata: Mutex::new(Vec::new()),
            definition: Mutex::new(None),
            type_system: Mutex::new(None),
            pools: Mutex::new(HashMap::new()),
            owner_of: Mutex::new(HashMap::new()),
            sizing: Box::new(sizing),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Definition
    // ─────────────────────────────────────────────────────────────────────

    /// Register a component's type/index metadata.
    ///
    /// Marks the cached definition and the cached type system stale;
    /// both rebuild on next use. Pools defined before this point keep
    /// the definition their instances were built with.
    pub fn register_metadata(&self, metadata: ComponentMetadata) {
        debug!(component = %metadata.component, "component metadata registered");
        self.metadata.lock().push(metadata);
        *self.definition.lock() = None;
        *self.type_system.lock() = None;
    }

    /// The merged definition, built lazily and cached until the next
    /// metadata registration.
    pub fn store_definition(&self) -> Result<Arc<StoreDefinition>> {
        let mut cache = self.definition.lock();
        if let Some(definition) = cache.as_ref() {
            return Ok(definition.clone());
        }
        let definition = Arc::new(StoreDefinition::from_metadata(&self.metadata.lock())?);
        *cache = Some(definition.clone());
        Ok(definition)
    }

    /// Build a standalone instance bound to the current definition.
    ///
    /// The first instance after a (re)build materializes the type system
    /// and captures it as the manager's current one; later instances
    /// reuse it instead of re-deriving it from the definition.
    pub fn create_new_instance(&self, tuning: &TuningConfig) -> Result<Arc<Store>> {
        let definition = self.store_definition()?;
        let mut cached = self.type_system.lock();
        let store = match cached.as_ref() {
            Some(lattice) => Store::with_type_system(definition, lattice.clone(), tuning.clone())?,
            None => {
                let store = Store::new(definition, tuning.clone())?;
                *cached = Some(store.type_system().clone());
                store
            }
        };
        Ok(Arc::new(store))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pools
    // ─────────────────────────────────────────────────────────────────────

    /// Define the pool for `requestor`.
    ///
    /// The sizing policy resolves the size; zero suppresses creation
    /// entirely (and a later `acquire` for this requestor reports "no
    /// pool configured"). Instances are created eagerly and the reverse
    /// ownership map is fully populated before the pool is visible.
    /// Defining a pool twice for the same requestor is an error.
    pub fn define_store_pool(
        &self,
        requestor: &str,
        min_size: usize,
        tuning: &TuningConfig,
    ) -> Result<()> {
        let size = self.sizing.pool_size(requestor, min_size);
        if size == 0 {
            debug!(requestor, min_size, "sizing policy suppressed pool creation");
            return Ok(());
        }
        if self.pools.lock().contains_key(requestor) {
            return Err(PoolError::PoolAlreadyDefined {
                requestor: requestor.to_string(),
            });
        }

        // Instance construction is the expensive part; do it before
        // touching the registries.
        let mut instances = Vec::with_capacity(size);
        for _ in 0..size {
            instances.push(self.create_new_instance(tuning)?);
        }
        let pool = Arc::new(StorePool::new(requestor, instances));

        let mut pools = self.pools.lock();
        if pools.contains_key(requestor) {
            return Err(PoolError::PoolAlreadyDefined {
                requestor: requestor.to_string(),
            });
        }
        let mut owner_of = self.owner_of.lock();
        for instance in pool.instances() {
            owner_of.insert(instance_key(instance), pool.clone());
        }
        pools.insert(requestor.to_string(), pool);
        debug!(requestor, size, "store pool defined");
        Ok(())
    }

    /// The pool defined for `requestor`, if any.
    pub fn pool(&self, requestor: &str) -> Option<Arc<StorePool>> {
        self.pools.lock().get(requestor).cloned()
    }

    /// Acquire an instance on behalf of `requestor`.
    ///
    /// A requestor without a defined pool gets a "no pool configured"
    /// error, distinct from exhaustion of an existing pool.
    pub fn acquire(&self, requestor: &str) -> Result<Arc<Store>> {
        let pool = self
            .pool(requestor)
            .ok_or_else(|| PoolError::NoPoolConfigured {
                requestor: requestor.to_string(),
                requested: 1,
                available: 0,
            })?;
        pool.acquire()
    }

    /// Release an instance back to the pool that owns it.
    ///
    /// Fails with a wrong-manager error for instances this manager never
    /// issued, regardless of any pool's spare capacity.
    pub fn release(&self, instance: &Arc<Store>) -> Result<()> {
        let pool = self
            .owner_of
            .lock()
            .get(&instance_key(instance))
            .cloned()
            .ok_or(PoolError::WrongManager)?;
        pool.release(instance)
    }
}

impl Default for StoreManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StoreManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreManager")
            .field("components", &self.metadata.lock().len())
            .field("pools", &self.pools.lock().len())
            .field("definition_cached", &self.definition.lock().is_some())
            .finish()
    }
}
