//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a small annotation-style
//! type lattice, a key table standing in for record contents, and the
//! comparator reading it.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use trellis_core::{Addr, ComparatorRef, ComponentMetadata, IndexDescriptor, IndexKind, TypeDecl};
use trellis_pool::StoreManager;
use trellis_store::{Store, TuningConfig};

/// Shared record-key table: the record "contents" the engine itself
/// never sees. Comparators close over it.
#[derive(Debug, Default)]
pub struct KeyTable {
    keys: RwLock<HashMap<Addr, i64>>,
}

impl KeyTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Assign the key of a record.
    pub fn set(&self, fs: Addr, key: i64) {
        self.keys.write().unwrap().insert(fs, key);
    }

    /// The key of a record; panics on an unregistered address.
    pub fn get(&self, fs: Addr) -> i64 {
        *self
            .keys
            .read()
            .unwrap()
            .get(&fs)
            .expect("record key registered")
    }
}

/// A comparator ordering records by ascending key from `table`.
pub fn ascending_key(table: Arc<KeyTable>) -> ComparatorRef {
    Arc::new(move |a: Addr, b: Addr| -> Ordering { table.get(a).cmp(&table.get(b)) })
}

/// Labels of the indices every fixture store defines.
pub const SORTED_LABEL: &str = "position";
pub const SET_LABEL: &str = "first-at-position";
pub const BAG_LABEL: &str = "arrivals";

/// A ready-made pipeline: a manager with one registered component
/// (Top / Annotation / Token / Sentence plus one index of each kind over
/// Annotation) and the key table their shared comparator reads.
pub struct StoreFixture {
    pub manager: StoreManager,
    pub table: Arc<KeyTable>,
}

impl StoreFixture {
    /// Create a fixture with the standard lattice and indices.
    pub fn new() -> Self {
        let table = KeyTable::new();
        let cmp = ascending_key(table.clone());

        let manager = StoreManager::new();
        manager.register_metadata(
            ComponentMetadata::new("testkit")
                .with_type(TypeDecl::root("Top"))
                .with_type(TypeDecl::new("Annotation", "Top"))
                .with_type(TypeDecl::new("Token", "Annotation"))
                .with_type(TypeDecl::new("Sentence", "Annotation"))
                .with_index(IndexDescriptor::new(
                    SORTED_LABEL,
                    "Annotation",
                    IndexKind::Sorted,
                    cmp.clone(),
                ))
                .with_index(IndexDescriptor::new(
                    SET_LABEL,
                    "Annotation",
                    IndexKind::Set,
                    cmp.clone(),
                ))
                .with_index(IndexDescriptor::new(
                    BAG_LABEL,
                    "Annotation",
                    IndexKind::Bag,
                    cmp,
                )),
        );
        Self { manager, table }
    }

    /// A standalone store bound to the fixture's definition.
    pub fn new_store(&self) -> Arc<Store> {
        self.manager
            .create_new_instance(&TuningConfig::default())
            .expect("fixture store builds")
    }

    /// Create a record of `type_name` with `key`, without indexing it.
    pub fn make_record(&self, store: &Store, type_name: &str, key: i64) -> Addr {
        let t = store
            .type_system()
            .code_of(type_name)
            .expect("fixture type exists");
        let fs = store.create_fs(t).expect("record creation succeeds");
        self.table.set(fs, key);
        fs
    }

    /// Create and index a record in the store's initial view.
    pub fn index_record(&self, store: &Store, type_name: &str, key: i64) -> Addr {
        let fs = self.make_record(store, type_name, key);
        store
            .initial_view()
            .expect("initial view exists")
            .add_fs(fs)
            .expect("indexing succeeds");
        fs
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}
