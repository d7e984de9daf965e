//! The merged store definition.
//!
//! Every pipeline component registers its own slice of type and index
//! metadata; the definition is the merged union all store instances are
//! built from. Merging is declaration-level only; the expensive type
//! system materialization is a separate step so a manager can reuse one
//! committed lattice across many instances.

use std::sync::Arc;

use trellis_core::{ComponentMetadata, CoreError, IndexDescriptor, TypeDecl, TypeLattice};

use crate::error::StoreError;

/// Immutable merged view of all registered component metadata.
#[derive(Debug)]
pub struct StoreDefinition {
    components: Vec<String>,
    types: Vec<TypeDecl>,
    indexes: Vec<IndexDescriptor>,
}

impl StoreDefinition {
    /// Merge component metadata into one definition.
    ///
    /// Type declarations union (identical re-declarations collapse;
    /// conflicting parents surface later, at materialization). Index
    /// descriptors union by label: identical descriptors collapse, and
    /// the same label with a different type, kind, or comparator
    /// instance is an error.
    pub fn from_metadata(metadata: &[ComponentMetadata]) -> Result<Self, StoreError> {
        let mut components = Vec::with_capacity(metadata.len());
        let mut types: Vec<TypeDecl> = Vec::new();
        let mut indexes: Vec<IndexDescriptor> = Vec::new();

        for md in metadata {
            components.push(md.component.clone());
            for decl in &md.types {
                if !types.contains(decl) {
                    types.push(decl.clone());
                }
            }
            for descriptor in &md.indexes {
                match indexes.iter().find(|d| d.label == descriptor.label) {
                    None => indexes.push(descriptor.clone()),
                    Some(existing) if existing.describes_same_index(descriptor) => {}
                    Some(_) => {
                        return Err(StoreError::ConflictingIndex {
                            label: descriptor.label.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            components,
            types,
            indexes,
        })
    }

    /// Names of the components that contributed metadata.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The merged type declarations.
    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    /// The merged index descriptors.
    pub fn indexes(&self) -> &[IndexDescriptor] {
        &self.indexes
    }

    /// Materialize the committed type system from the merged
    /// declarations. This is the expensive step; callers share the
    /// result via `Arc`.
    pub fn materialize(&self) -> Result<Arc<TypeLattice>, CoreError> {
        Ok(Arc::new(TypeLattice::build(&self.types)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trellis_core::{Addr, ComparatorRef, IndexKind};

    fn cmp() -> ComparatorRef {
        Arc::new(|a: Addr, b: Addr| a.as_raw().cmp(&b.as_raw()))
    }

    fn base_metadata(comparator: ComparatorRef) -> ComponentMetadata {
        ComponentMetadata::new("tokenizer")
            .with_type(TypeDecl::root("Top"))
            .with_type(TypeDecl::new("Annotation", "Top"))
            .with_index(IndexDescriptor::new(
                "pos",
                "Annotation",
                IndexKind::Sorted,
                comparator,
            ))
    }

    #[test]
    fn test_identical_metadata_collapses() {
        let shared = cmp();
        let merged = StoreDefinition::from_metadata(&[
            base_metadata(shared.clone()),
            base_metadata(shared),
        ])
        .unwrap();
        assert_eq!(merged.types().len(), 2);
        assert_eq!(merged.indexes().len(), 1);
        assert_eq!(merged.components().len(), 2);
    }

    #[test]
    fn test_conflicting_index_label_rejected() {
        let shared = cmp();
        let other = ComponentMetadata::new("parser").with_index(IndexDescriptor::new(
            "pos",
            "Annotation",
            IndexKind::Bag,
            shared.clone(),
        ));
        let err =
            StoreDefinition::from_metadata(&[base_metadata(shared), other]).unwrap_err();
        assert!(matches!(err, StoreError::ConflictingIndex { .. }));
    }

    #[test]
    fn test_materialize_builds_lattice() {
        let merged = StoreDefinition::from_metadata(&[base_metadata(cmp())]).unwrap();
        let lattice = merged.materialize().unwrap();
        assert_eq!(lattice.len(), 2);
        assert!(lattice.code_of("Annotation").is_some());
    }

    #[test]
    fn test_conflicting_types_surface_at_materialize() {
        let shared = cmp();
        let other = ComponentMetadata::new("parser").with_type(TypeDecl::new("Annotation", "Annotation"));
        let merged = StoreDefinition::from_metadata(&[base_metadata(shared), other]).unwrap();
        assert!(merged.materialize().is_err());
    }
}
