//! End-to-end behavior of the assembled system: records keyed through an
//! external table, sorted indices with duplicate keys, cursor staleness,
//! and the pooled store lifecycle.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use trellis::{
    Addr, ComparatorRef, ComponentMetadata, IndexDescriptor, IndexKind, StoreManager,
    TuningConfig, TypeDecl,
};

/// Shared record-key table: the "record contents" the engine never sees.
#[derive(Default)]
struct KeyTable {
    keys: RwLock<HashMap<Addr, i64>>,
}

impl KeyTable {
    fn set(&self, fs: Addr, key: i64) {
        self.keys.write().unwrap().insert(fs, key);
    }

    fn get(&self, fs: Addr) -> i64 {
        *self.keys.read().unwrap().get(&fs).expect("key registered")
    }
}

/// A pipeline fixture: manager with one component registered, plus the
/// key table its comparator reads.
struct Pipeline {
    manager: StoreManager,
    table: Arc<KeyTable>,
}

impl Pipeline {
    fn new() -> Self {
        let table = Arc::new(KeyTable::default());
        let cmp: ComparatorRef = {
            let table = table.clone();
            Arc::new(move |a: Addr, b: Addr| -> Ordering {
                table.get(a).cmp(&table.get(b))
            })
        };

        let manager = StoreManager::new();
        manager.register_metadata(
            ComponentMetadata::new("annotator")
                .with_type(TypeDecl::root("Top"))
                .with_type(TypeDecl::new("Annotation", "Top"))
                .with_type(TypeDecl::new("Token", "Annotation"))
                .with_type(TypeDecl::new("Sentence", "Annotation"))
                .with_index(IndexDescriptor::new(
                    "position",
                    "Annotation",
                    IndexKind::Sorted,
                    cmp,
                )),
        );
        Self { manager, table }
    }
}

#[test]
fn test_sorted_index_duplicate_keys_and_identity_removal() {
    let pipeline = Pipeline::new();
    let store = pipeline
        .manager
        .create_new_instance(&TuningConfig::default())
        .unwrap();
    let token = store.type_system().code_of("Token").unwrap();
    let view = store.initial_view().unwrap();

    // Insert keys [5, 1, 5, 3] through distinct addresses a, b, c, d.
    let mut addrs = Vec::new();
    for key in [5i64, 1, 5, 3] {
        let fs = store.create_fs(token).unwrap();
        pipeline.table.set(fs, key);
        view.add_fs(fs).unwrap();
        addrs.push(fs);
    }
    let (a, b, c, d) = (addrs[0], addrs[1], addrs[2], addrs[3]);

    let index = view.get_index("position").unwrap();
    assert_eq!(index.size(), 4);

    // Order must be [b(1), d(3), then the two key-5 records in either
    // order].
    let mut seen = Vec::new();
    let mut cursor = index.cursor();
    cursor.move_to_first();
    while let Some(fs) = cursor.get() {
        seen.push(fs);
        cursor.move_to_next();
    }
    assert_eq!(seen[0], b);
    assert_eq!(seen[1], d);
    assert!(seen[2..] == [a, c] || seen[2..] == [c, a]);

    // Removing by address a must leave c, the other key-5 record.
    view.remove_fs(a).unwrap();
    let index = view.get_index("position").unwrap();
    assert_eq!(index.size(), 3);
    assert!(index.contains(c));

    let mut remaining = Vec::new();
    let mut cursor = index.cursor();
    cursor.move_to_first();
    while let Some(fs) = cursor.get() {
        remaining.push(fs);
        cursor.move_to_next();
    }
    assert_eq!(remaining, vec![b, d, c]);
}

#[test]
fn test_remove_absent_record_is_noop() {
    let pipeline = Pipeline::new();
    let store = pipeline
        .manager
        .create_new_instance(&TuningConfig::default())
        .unwrap();
    let token = store.type_system().code_of("Token").unwrap();
    let view = store.initial_view().unwrap();

    let fs = store.create_fs(token).unwrap();
    pipeline.table.set(fs, 7);
    view.add_fs(fs).unwrap();

    let ghost = store.create_fs(token).unwrap();
    pipeline.table.set(ghost, 7);
    // Never indexed; removing it must not disturb the indexed record.
    assert!(!view.remove_fs(ghost).unwrap());
    assert_eq!(view.get_index("position").unwrap().size(), 1);
}

#[test]
fn test_cursor_staleness_lifecycle() {
    let pipeline = Pipeline::new();
    let store = pipeline
        .manager
        .create_new_instance(&TuningConfig::default())
        .unwrap();
    let token = store.type_system().code_of("Token").unwrap();
    let view = store.initial_view().unwrap();

    let first = store.create_fs(token).unwrap();
    pipeline.table.set(first, 1);
    view.add_fs(first).unwrap();

    let cursor = view.get_index("position").unwrap().cursor();
    assert!(!cursor.is_concurrent_modification());

    // Any insert on the cursor's type makes it stale.
    let second = store.create_fs(token).unwrap();
    pipeline.table.set(second, 2);
    view.add_fs(second).unwrap();
    assert!(cursor.is_concurrent_modification());

    // Re-synchronizing clears the flag until the next mutation.
    let mut cursor = cursor;
    cursor.reset_concurrent_modification();
    assert!(!cursor.is_concurrent_modification());

    view.remove_fs(second).unwrap();
    assert!(cursor.is_concurrent_modification());
}

#[test]
fn test_composite_iteration_over_subtypes() {
    let pipeline = Pipeline::new();
    let store = pipeline
        .manager
        .create_new_instance(&TuningConfig::default())
        .unwrap();
    let lattice = store.type_system().clone();
    let annotation = lattice.code_of("Annotation").unwrap();
    let token = lattice.code_of("Token").unwrap();
    let sentence = lattice.code_of("Sentence").unwrap();
    let view = store.initial_view().unwrap();

    // Interleave keys across the two subtypes.
    let mut expected = Vec::new();
    for (key, t) in [(4i64, token), (1, sentence), (3, token), (2, sentence)] {
        let fs = store.create_fs(t).unwrap();
        pipeline.table.set(fs, key);
        view.add_fs(fs).unwrap();
        expected.push((key, fs));
    }
    expected.sort_by_key(|(key, _)| *key);

    // The Annotation-level view merges Token and Sentence leaves into
    // one sorted sequence.
    let index = view.get_index_for("position", annotation).unwrap();
    assert_eq!(index.size(), 4);

    let mut seen = Vec::new();
    let mut cursor = index.cursor();
    cursor.move_to_first();
    while let Some(fs) = cursor.get() {
        seen.push(fs);
        cursor.move_to_next();
    }
    let expected_order: Vec<Addr> = expected.iter().map(|(_, fs)| *fs).collect();
    assert_eq!(seen, expected_order);

    // And the same sequence backwards.
    let mut rev = Vec::new();
    cursor.move_to_last();
    while let Some(fs) = cursor.get() {
        rev.push(fs);
        cursor.move_to_previous();
    }
    rev.reverse();
    assert_eq!(rev, expected_order);

    // Narrowed to Token, only the token records remain.
    let tokens = view.get_index_for("position", token).unwrap();
    assert_eq!(tokens.size(), 2);
}

#[test]
fn test_pool_lifecycle_across_requestors() {
    let pipeline = Pipeline::new();
    let tuning = TuningConfig::default();
    pipeline
        .manager
        .define_store_pool("stage-a", 2, &tuning)
        .unwrap();
    pipeline
        .manager
        .define_store_pool("stage-b", 1, &tuning)
        .unwrap();

    // Pool of size 2: two acquires succeed, the third fails.
    let s1 = pipeline.manager.acquire("stage-a").unwrap();
    let s2 = pipeline.manager.acquire("stage-a").unwrap();
    assert!(pipeline.manager.acquire("stage-a").is_err());

    // Independent pools: stage-b is unaffected.
    let s3 = pipeline.manager.acquire("stage-b").unwrap();

    // After one release, the next acquire succeeds again.
    pipeline.manager.release(&s1).unwrap();
    let s4 = pipeline.manager.acquire("stage-a").unwrap();

    // A second manager never issued these instances.
    let other = StoreManager::new();
    assert!(other.release(&s2).is_err());

    pipeline.manager.release(&s2).unwrap();
    pipeline.manager.release(&s3).unwrap();
    pipeline.manager.release(&s4).unwrap();
}

#[test]
fn test_released_store_comes_back_clean() {
    let pipeline = Pipeline::new();
    let tuning = TuningConfig::default();
    pipeline
        .manager
        .define_store_pool("stage-a", 1, &tuning)
        .unwrap();

    let store = pipeline.manager.acquire("stage-a").unwrap();
    let token = store.type_system().code_of("Token").unwrap();
    let view = store.initial_view().unwrap();
    let fs = store.create_fs(token).unwrap();
    pipeline.table.set(fs, 1);
    view.add_fs(fs).unwrap();

    pipeline.manager.release(&store).unwrap();

    let again = pipeline.manager.acquire("stage-a").unwrap();
    assert_eq!(again.fs_count(), 0);
    assert_eq!(again.initial_view().unwrap().get_index("position").unwrap().size(), 0);
}
