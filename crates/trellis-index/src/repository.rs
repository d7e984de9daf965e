//! The per-view index repository.
//!
//! A repository maps (label, type code) to physical leaf indices. One
//! leaf exists per concrete type in the declared type's subtree, so the
//! composite view over "a type and its subtypes" is a logical union of
//! leaves sharing the per-type modification counters, never a separate
//! data copy.
//!
//! Mutations to one repository are expected to be externally serialized
//! (single writer per view); the interior locks exist so cursors handed
//! out earlier can keep reading while later mutations proceed, with
//! staleness detected through the counter protocol.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use trellis_core::{Addr, ComparatorRef, IndexKind, OracleRef, TypeCode};

use crate::counters::ModCounters;
use crate::cursor::{CompositeCursor, IndexCursor, LeafCursor};
use crate::error::IndexError;
use crate::leaf::{LeafIndex, LeafRef};

/// Default per-index capacity hint when none is configured.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// One registered index definition.
#[derive(Clone)]
struct IndexDefinition {
    type_code: TypeCode,
    kind: IndexKind,
    comparator: ComparatorRef,
}

#[derive(Default)]
struct RepoInner {
    /// Label -> definition. Labels are unique per repository.
    definitions: HashMap<String, IndexDefinition>,
    /// (label, concrete type) -> leaf.
    leaves: HashMap<(String, TypeCode), LeafRef>,
    /// Concrete type -> every leaf covering it, across labels. This is
    /// the add/remove fan-out list.
    by_type: HashMap<TypeCode, Vec<LeafRef>>,
}

/// The per-view collection of named indices.
pub struct IndexRepository {
    oracle: OracleRef,
    counters: Arc<ModCounters>,
    initial_capacity: usize,
    inner: RwLock<RepoInner>,
}

impl IndexRepository {
    /// Create an empty repository bound to a type oracle.
    pub fn new(oracle: OracleRef, initial_capacity: usize) -> Self {
        let counters = Arc::new(ModCounters::new(oracle.type_count()));
        Self {
            oracle,
            counters,
            initial_capacity,
            inner: RwLock::new(RepoInner::default()),
        }
    }

    /// The shared per-type modification counter block.
    pub fn counters(&self) -> &Arc<ModCounters> {
        &self.counters
    }

    // ─────────────────────────────────────────────────────────────────────
    // Definition
    // ─────────────────────────────────────────────────────────────────────

    /// Register an index over `type_code` and all its subtypes.
    ///
    /// Returns `Ok(false)` if an identical definition (same type, kind,
    /// and comparator instance) already exists under this label; an
    /// incompatible redefinition is an error.
    pub fn define_index(
        &self,
        label: &str,
        type_code: TypeCode,
        kind: IndexKind,
        comparator: ComparatorRef,
    ) -> Result<bool, IndexError> {
        if type_code.as_index() >= self.oracle.type_count() {
            return Err(IndexError::UnknownType(type_code));
        }

        let mut inner = self.inner.write();
        if let Some(existing) = inner.definitions.get(label) {
            let identical = existing.type_code == type_code
                && existing.kind == kind
                && Arc::ptr_eq(&existing.comparator, &comparator);
            if identical {
                return Ok(false);
            }
            return Err(IndexError::IncompatibleDefinition {
                label: label.to_string(),
            });
        }

        for t in self.oracle.subtypes_of(type_code) {
            let leaf: LeafRef = Arc::new(LeafIndex::new(
                label,
                t,
                kind,
                comparator.clone(),
                self.initial_capacity,
            ));
            inner.leaves.insert((label.to_string(), t), leaf.clone());
            inner.by_type.entry(t).or_default().push(leaf);
        }
        inner.definitions.insert(
            label.to_string(),
            IndexDefinition {
                type_code,
                kind,
                comparator,
            },
        );
        debug!(label, %type_code, %kind, "index defined");
        Ok(true)
    }

    /// Labels of all defined indices, in no particular order.
    pub fn labels(&self) -> Vec<String> {
        self.inner.read().definitions.keys().cloned().collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Record maintenance
    // ─────────────────────────────────────────────────────────────────────

    /// Insert `fs` into every index covering its concrete type.
    ///
    /// Bumps the type's modification counter once if any index changed.
    /// Returns whether anything changed (a record of a type with no
    /// indices is simply not indexed).
    pub fn add_fs(&self, fs: Addr) -> Result<bool, IndexError> {
        let t = self
            .oracle
            .type_code(fs)
            .ok_or(IndexError::UnknownRecord(fs))?;
        let inner = self.inner.read();
        let Some(leaves) = inner.by_type.get(&t) else {
            return Ok(false);
        };
        let mut changed = false;
        for leaf in leaves {
            changed |= leaf.insert(fs);
        }
        if changed {
            self.counters.bump(t);
        }
        Ok(changed)
    }

    /// Remove `fs` from every index covering its concrete type.
    ///
    /// Tolerant of the record being absent from some or all of them;
    /// bumps the modification counter only if something was removed.
    pub fn remove_fs(&self, fs: Addr) -> Result<bool, IndexError> {
        let t = self
            .oracle
            .type_code(fs)
            .ok_or(IndexError::UnknownRecord(fs))?;
        let inner = self.inner.read();
        let Some(leaves) = inner.by_type.get(&t) else {
            return Ok(false);
        };
        let mut changed = false;
        for leaf in leaves {
            changed |= leaf.remove(fs);
        }
        if changed {
            self.counters.bump(t);
        }
        Ok(changed)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────

    /// The index registered under `label`, at its declared type.
    pub fn get_index(&self, label: &str) -> Result<FsIndex, IndexError> {
        let declared = {
            let inner = self.inner.read();
            inner
                .definitions
                .get(label)
                .ok_or_else(|| IndexError::UnknownIndex(label.to_string()))?
                .type_code
        };
        self.get_index_for(label, declared)
    }

    /// The index registered under `label`, narrowed to `type_code` and
    /// its subtypes.
    ///
    /// Narrowing to a type outside the declared type's subtree is an
    /// error.
    pub fn get_index_for(&self, label: &str, type_code: TypeCode) -> Result<FsIndex, IndexError> {
        let inner = self.inner.read();
        let def = inner
            .definitions
            .get(label)
            .ok_or_else(|| IndexError::UnknownIndex(label.to_string()))?;
        if !self.oracle.is_subtype(type_code, def.type_code) {
            return Err(IndexError::TypeMismatch {
                label: label.to_string(),
                declared: def.type_code,
                requested: type_code,
            });
        }
        let leaves: Vec<LeafRef> = self
            .oracle
            .subtypes_of(type_code)
            .into_iter()
            .filter_map(|t| inner.leaves.get(&(label.to_string(), t)).cloned())
            .collect();
        Ok(FsIndex {
            label: label.to_string(),
            kind: def.kind,
            type_code,
            comparator: def.comparator.clone(),
            counters: self.counters.clone(),
            leaves,
        })
    }

    /// Flush every managed index. Label definitions survive; every
    /// outstanding cursor becomes stale.
    pub fn flush(&self) {
        let inner = self.inner.read();
        for leaf in inner.leaves.values() {
            leaf.flush();
        }
        self.counters.bump_all();
        debug!(indices = inner.leaves.len(), "index repository flushed");
    }
}

impl std::fmt::Debug for IndexRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("IndexRepository")
            .field("definitions", &inner.definitions.len())
            .field("leaves", &inner.leaves.len())
            .finish()
    }
}

/// A queryable view over one label: the leaf for the requested type plus
/// the leaves of all its subtypes.
#[derive(Clone)]
pub struct FsIndex {
    label: String,
    kind: IndexKind,
    type_code: TypeCode,
    comparator: ComparatorRef,
    counters: Arc<ModCounters>,
    leaves: Vec<LeafRef>,
}

impl FsIndex {
    /// The label this view was looked up under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The duplicate/ordering policy of the underlying index.
    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    /// The type this view is narrowed to.
    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    /// Total number of entries across the covered subtree.
    pub fn size(&self) -> usize {
        self.leaves.iter().map(|l| l.size()).sum()
    }

    /// Whether the view holds no entries.
    pub fn is_empty(&self) -> bool {
        self.leaves.iter().all(|l| l.is_empty())
    }

    /// Whether any covered leaf matches `fs`.
    pub fn contains(&self, fs: Addr) -> bool {
        self.leaves.iter().any(|l| l.contains(fs))
    }

    /// Some entry matching `fs` (by key for ordered kinds, by identity
    /// for bags), searching leaves in type-code order.
    pub fn find(&self, fs: Addr) -> Option<Addr> {
        self.leaves.iter().find_map(|l| l.find(fs))
    }

    /// A cursor positioned at the first entry.
    pub fn cursor(&self) -> IndexCursor {
        if self.leaves.len() == 1 {
            IndexCursor::Leaf(LeafCursor::new(self.leaves[0].clone(), self.counters.clone()))
        } else {
            let cursors = self
                .leaves
                .iter()
                .map(|l| LeafCursor::new(l.clone(), self.counters.clone()))
                .collect();
            IndexCursor::Composite(CompositeCursor::new(
                self.kind,
                self.comparator.clone(),
                cursors,
            ))
        }
    }
}

impl std::fmt::Debug for FsIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsIndex")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("type_code", &self.type_code)
            .field("leaves", &self.leaves.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trellis_core::TypeOracle;

    /// Fixed four-type lattice: 0 Top { 1 Ann { 2 Token }, 3 Marker }.
    struct FixedOracle {
        types: Vec<TypeCode>,
    }

    impl FixedOracle {
        fn new(types: Vec<u32>) -> Arc<Self> {
            Arc::new(Self {
                types: types.into_iter().map(TypeCode).collect(),
            })
        }
    }

    impl TypeOracle for FixedOracle {
        fn type_code(&self, fs: Addr) -> Option<TypeCode> {
            self.types.get(fs.as_raw() as usize).copied()
        }

        fn is_subtype(&self, sub: TypeCode, ancestor: TypeCode) -> bool {
            let end = match ancestor.as_raw() {
                0 => 4,
                1 => 3,
                2 => 3,
                3 => 4,
                _ => return false,
            };
            sub.as_raw() >= ancestor.as_raw() && sub.as_raw() < end
        }

        fn subtypes_of(&self, t: TypeCode) -> Vec<TypeCode> {
            let end = match t.as_raw() {
                0 => 4,
                1 => 3,
                2 => 3,
                3 => 4,
                _ => t.as_raw(),
            };
            (t.as_raw()..end).map(TypeCode).collect()
        }

        fn type_count(&self) -> usize {
            4
        }
    }

    fn by_raw() -> ComparatorRef {
        Arc::new(|a: Addr, b: Addr| a.as_raw().cmp(&b.as_raw()))
    }

    #[test]
    fn test_define_index_is_idempotent_for_identical() {
        let repo = IndexRepository::new(FixedOracle::new(vec![]), 8);
        let cmp = by_raw();
        assert!(repo
            .define_index("pos", TypeCode(1), IndexKind::Sorted, cmp.clone())
            .unwrap());
        assert!(!repo
            .define_index("pos", TypeCode(1), IndexKind::Sorted, cmp.clone())
            .unwrap());
        let err = repo
            .define_index("pos", TypeCode(1), IndexKind::Bag, cmp)
            .unwrap_err();
        assert!(matches!(err, IndexError::IncompatibleDefinition { .. }));
    }

    #[test]
    fn test_define_index_unknown_type() {
        let repo = IndexRepository::new(FixedOracle::new(vec![]), 8);
        let err = repo
            .define_index("pos", TypeCode(9), IndexKind::Sorted, by_raw())
            .unwrap_err();
        assert!(matches!(err, IndexError::UnknownType(_)));
    }

    #[test]
    fn test_add_fs_lands_in_subtree_leaf() {
        // Records: @0 is a Token (type 2), @1 is a Marker (type 3).
        let oracle = FixedOracle::new(vec![2, 3]);
        let repo = IndexRepository::new(oracle, 8);
        repo.define_index("ann", TypeCode(1), IndexKind::Sorted, by_raw())
            .unwrap();

        // The Token lands in the "ann" index (Token is under Annotation),
        // the Marker does not.
        assert!(repo.add_fs(Addr(0)).unwrap());
        assert!(!repo.add_fs(Addr(1)).unwrap());

        let idx = repo.get_index("ann").unwrap();
        assert_eq!(idx.size(), 1);
        assert!(idx.contains(Addr(0)));
    }

    #[test]
    fn test_add_fs_unknown_record() {
        let repo = IndexRepository::new(FixedOracle::new(vec![]), 8);
        let err = repo.add_fs(Addr(7)).unwrap_err();
        assert!(matches!(err, IndexError::UnknownRecord(_)));
    }

    #[test]
    fn test_narrowing_to_unrelated_type_is_error() {
        let repo = IndexRepository::new(FixedOracle::new(vec![]), 8);
        repo.define_index("ann", TypeCode(1), IndexKind::Sorted, by_raw())
            .unwrap();
        let err = repo.get_index_for("ann", TypeCode(3)).unwrap_err();
        assert!(matches!(err, IndexError::TypeMismatch { .. }));
        // Narrowing within the subtree is fine.
        assert!(repo.get_index_for("ann", TypeCode(2)).is_ok());
    }

    #[test]
    fn test_unknown_label() {
        let repo = IndexRepository::new(FixedOracle::new(vec![]), 8);
        assert!(matches!(
            repo.get_index("nope"),
            Err(IndexError::UnknownIndex(_))
        ));
    }

    #[test]
    fn test_composite_view_unions_subtree() {
        // @0 Annotation, @1 Token, @2 Token, @3 Marker.
        let oracle = FixedOracle::new(vec![1, 2, 2, 3]);
        let repo = IndexRepository::new(oracle, 8);
        repo.define_index("all", TypeCode(0), IndexKind::Sorted, by_raw())
            .unwrap();
        for raw in 0..4 {
            repo.add_fs(Addr(raw)).unwrap();
        }

        let whole = repo.get_index("all").unwrap();
        assert_eq!(whole.size(), 4);

        let anns = repo.get_index_for("all", TypeCode(1)).unwrap();
        assert_eq!(anns.size(), 3);
        assert!(anns.contains(Addr(2)));
        assert!(!anns.contains(Addr(3)));
    }

    #[test]
    fn test_remove_fs_tolerates_absence() {
        let oracle = FixedOracle::new(vec![2]);
        let repo = IndexRepository::new(oracle, 8);
        repo.define_index("ann", TypeCode(1), IndexKind::Sorted, by_raw())
            .unwrap();
        assert!(!repo.remove_fs(Addr(0)).unwrap());
        repo.add_fs(Addr(0)).unwrap();
        assert!(repo.remove_fs(Addr(0)).unwrap());
        assert_eq!(repo.get_index("ann").unwrap().size(), 0);
    }

    #[test]
    fn test_counter_bumps_only_on_change() {
        let oracle = FixedOracle::new(vec![2]);
        let repo = IndexRepository::new(oracle, 8);
        repo.define_index("ann", TypeCode(1), IndexKind::Sorted, by_raw())
            .unwrap();

        let t = TypeCode(2);
        assert_eq!(repo.counters().get(t), 0);
        repo.add_fs(Addr(0)).unwrap();
        assert_eq!(repo.counters().get(t), 1);
        // Removing an absent record is a no-op and must not invalidate
        // cursors.
        repo.remove_fs(Addr(0)).unwrap();
        repo.remove_fs(Addr(0)).unwrap();
        assert_eq!(repo.counters().get(t), 2);
    }

    #[test]
    fn test_flush_clears_and_invalidates() {
        let oracle = FixedOracle::new(vec![2, 2]);
        let repo = IndexRepository::new(oracle, 8);
        repo.define_index("ann", TypeCode(1), IndexKind::Sorted, by_raw())
            .unwrap();
        repo.add_fs(Addr(0)).unwrap();
        repo.add_fs(Addr(1)).unwrap();

        let cursor = repo.get_index("ann").unwrap().cursor();
        assert!(!cursor.is_concurrent_modification());

        repo.flush();
        assert_eq!(repo.get_index("ann").unwrap().size(), 0);
        assert!(cursor.is_concurrent_modification());
        // Definitions survive the flush.
        assert!(repo.labels().contains(&"ann".to_string()));
    }
}
