//! Component metadata: the type and index declarations each pipeline
//! component contributes to the merged store definition.
//!
//! Metadata is plain declaration data except for the comparator, which is
//! an opaque shared function. Comparator identity is pointer identity:
//! two descriptors describe the same index only if they share the same
//! comparator instance.

use std::fmt;
use std::sync::Arc;

use crate::lattice::TypeDecl;
use crate::order::ComparatorRef;
use crate::types::IndexKind;

/// Declaration of one index: a label, the type it covers (including all
/// subtypes), its kind, and the comparator that orders it.
#[derive(Clone)]
pub struct IndexDescriptor {
    pub label: String,
    pub type_name: String,
    pub kind: IndexKind,
    pub comparator: ComparatorRef,
}

impl IndexDescriptor {
    pub fn new(
        label: impl Into<String>,
        type_name: impl Into<String>,
        kind: IndexKind,
        comparator: ComparatorRef,
    ) -> Self {
        Self {
            label: label.into(),
            type_name: type_name.into(),
            kind,
            comparator,
        }
    }

    /// Whether two descriptors describe the same index: same label, type,
    /// kind, and comparator instance.
    pub fn describes_same_index(&self, other: &IndexDescriptor) -> bool {
        self.label == other.label
            && self.type_name == other.type_name
            && self.kind == other.kind
            && Arc::ptr_eq(&self.comparator, &other.comparator)
    }
}

impl fmt::Debug for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexDescriptor")
            .field("label", &self.label)
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The metadata one component registers with the store manager: the types
/// it introduces and the indices it needs.
#[derive(Debug, Clone, Default)]
pub struct ComponentMetadata {
    /// Component identity, for diagnostics only.
    pub component: String,
    /// Type declarations (merged across components into one lattice).
    pub types: Vec<TypeDecl>,
    /// Index declarations (merged across components by label).
    pub indexes: Vec<IndexDescriptor>,
}

impl ComponentMetadata {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            types: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    pub fn with_index(mut self, descriptor: IndexDescriptor) -> Self {
        self.indexes.push(descriptor);
        self
    }
}
