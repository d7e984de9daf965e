//! The store instance.
//!
//! A store holds the records of one subject of analysis: a store-wide
//! address registry (the store is the type-code oracle for its own
//! records) and any number of named views, each with its own index
//! repository. Stores are expensive to construct (materializing the
//! type system dominates), which is why instances are pooled and reused
//! rather than created per subject.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};
use trellis_core::{Addr, ComparatorRef, IndexKind, TypeCode, TypeLattice, TypeOracle};

use crate::config::TuningConfig;
use crate::definition::StoreDefinition;
use crate::error::{Result, StoreError};
use crate::view::View;

/// The view every store starts with.
pub const INITIAL_VIEW: &str = "_initial";

/// An index descriptor with its type name resolved against the committed
/// lattice.
#[derive(Clone)]
pub(crate) struct ResolvedIndex {
    pub(crate) label: String,
    pub(crate) type_code: TypeCode,
    pub(crate) kind: IndexKind,
    pub(crate) comparator: ComparatorRef,
}

/// The store-wide type oracle: the committed lattice plus the address
/// registry filled in as records are created.
pub struct StoreOracle {
    lattice: Arc<TypeLattice>,
    types: RwLock<Vec<TypeCode>>,
}

impl TypeOracle for StoreOracle {
    fn type_code(&self, fs: Addr) -> Option<TypeCode> {
        self.types.read().get(fs.as_raw() as usize).copied()
    }

    fn is_subtype(&self, sub: TypeCode, ancestor: TypeCode) -> bool {
        self.lattice.is_subtype(sub, ancestor)
    }

    fn subtypes_of(&self, t: TypeCode) -> Vec<TypeCode> {
        self.lattice.subtree(t).collect()
    }

    fn type_count(&self) -> usize {
        self.lattice.len()
    }
}

/// One reusable store instance.
pub struct Store {
    definition: Arc<StoreDefinition>,
    lattice: Arc<TypeLattice>,
    oracle: Arc<StoreOracle>,
    indexes: Vec<ResolvedIndex>,
    views: RwLock<HashMap<String, Arc<View>>>,
    tuning: TuningConfig,
}

impl Store {
    /// Build a store, materializing the type system from the definition.
    pub fn new(definition: Arc<StoreDefinition>, tuning: TuningConfig) -> Result<Self> {
        let lattice = definition.materialize()?;
        Self::with_type_system(definition, lattice, tuning)
    }

    /// Build a store around an already-materialized type system.
    ///
    /// The lattice must have been built from this definition; the
    /// manager uses this to share one committed type system across all
    /// the instances it creates.
    pub fn with_type_system(
        definition: Arc<StoreDefinition>,
        lattice: Arc<TypeLattice>,
        tuning: TuningConfig,
    ) -> Result<Self> {
        let mut indexes = Vec::with_capacity(definition.indexes().len());
        for descriptor in definition.indexes() {
            let type_code = lattice.require(&descriptor.type_name)?;
            indexes.push(ResolvedIndex {
                label: descriptor.label.clone(),
                type_code,
                kind: descriptor.kind,
                comparator: descriptor.comparator.clone(),
            });
        }
        let oracle = Arc::new(StoreOracle {
            lattice: lattice.clone(),
            types: RwLock::new(Vec::new()),
        });
        let store = Self {
            definition,
            lattice,
            oracle,
            indexes,
            views: RwLock::new(HashMap::new()),
            tuning,
        };
        // The initial view exists from the start, like every view, with
        // all definition indices in place.
        store.view(INITIAL_VIEW)?;
        debug!(
            types = store.lattice.len(),
            indexes = store.indexes.len(),
            "store instance created"
        );
        Ok(store)
    }

    /// The definition this store was built from.
    pub fn definition(&self) -> &Arc<StoreDefinition> {
        &self.definition
    }

    /// The committed type system.
    pub fn type_system(&self) -> &Arc<TypeLattice> {
        &self.lattice
    }

    /// The tuning settings this store was built with.
    pub fn tuning(&self) -> &TuningConfig {
        &self.tuning
    }

    // ─────────────────────────────────────────────────────────────────────
    // Records
    // ─────────────────────────────────────────────────────────────────────

    /// Allocate the next address and record its concrete type.
    ///
    /// The address is stable until the store is reset. Creating a record
    /// does not index it; use a view's `add_fs` for that.
    pub fn create_fs(&self, type_code: TypeCode) -> Result<Addr> {
        if self.tuning.validate_types_on_create && type_code.as_index() >= self.lattice.len() {
            return Err(StoreError::UnknownTypeCode(type_code));
        }
        let mut types = self.oracle.types.write();
        let addr = Addr(types.len() as u32);
        types.push(type_code);
        Ok(addr)
    }

    /// The concrete type of a record, if the address is live.
    pub fn type_of(&self, fs: Addr) -> Option<TypeCode> {
        self.oracle.type_code(fs)
    }

    /// Number of records currently registered.
    pub fn fs_count(&self) -> usize {
        self.oracle.types.read().len()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────────

    /// Get a view by name, creating it on first access with all the
    /// definition's indices in place.
    pub fn view(&self, name: &str) -> Result<Arc<View>> {
        if let Some(view) = self.views.read().get(name) {
            return Ok(view.clone());
        }
        let mut views = self.views.write();
        // Re-check under the write lock; another caller may have won.
        if let Some(view) = views.get(name) {
            return Ok(view.clone());
        }
        let oracle: trellis_core::OracleRef = self.oracle.clone();
        let view = Arc::new(View::new(
            name,
            oracle,
            &self.indexes,
            self.tuning.initial_index_capacity,
        )?);
        views.insert(name.to_string(), view.clone());
        trace!(view = name, "view created");
        Ok(view)
    }

    /// The initial view.
    pub fn initial_view(&self) -> Result<Arc<View>> {
        self.view(INITIAL_VIEW)
    }

    /// Names of all existing views.
    pub fn view_names(&self) -> Vec<String> {
        self.views.read().keys().cloned().collect()
    }

    /// Reset the store for reuse: flush every view's indices (label
    /// definitions and capacity hints survive) and clear the address
    /// registry. Outstanding cursors all read as stale afterwards.
    pub fn reset(&self) {
        let views = self.views.read();
        for view in views.values() {
            view.repository().flush();
        }
        self.oracle.types.write().clear();
        trace!(views = views.len(), "store reset");
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("types", &self.lattice.len())
            .field("indexes", &self.indexes.len())
            .field("views", &self.views.read().len())
            .field("fs_count", &self.fs_count())
            .finish()
    }
}
