//! A view: one named partition of a store's records and indices.
//!
//! Each view owns its own index repository; the indices declared in the
//! store definition are defined in every view when the view is created.
//! Views share the store-wide address registry; a record created once
//! can be indexed in any number of views.

use trellis_core::{Addr, ComparatorRef, IndexKind, OracleRef, TypeCode};
use trellis_index::{FsIndex, IndexRepository};

use crate::error::Result;
use crate::store::ResolvedIndex;

/// One named view over a store.
pub struct View {
    name: String,
    repository: IndexRepository,
}

impl View {
    pub(crate) fn new(
        name: impl Into<String>,
        oracle: OracleRef,
        indexes: &[ResolvedIndex],
        initial_capacity: usize,
    ) -> Result<Self> {
        let repository = IndexRepository::new(oracle, initial_capacity);
        for idx in indexes {
            repository.define_index(&idx.label, idx.type_code, idx.kind, idx.comparator.clone())?;
        }
        Ok(Self {
            name: name.into(),
            repository,
        })
    }

    /// The view's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The view's index repository.
    pub fn repository(&self) -> &IndexRepository {
        &self.repository
    }

    /// Define an additional index in this view only.
    pub fn define_index(
        &self,
        label: &str,
        type_code: TypeCode,
        kind: IndexKind,
        comparator: ComparatorRef,
    ) -> Result<bool> {
        Ok(self
            .repository
            .define_index(label, type_code, kind, comparator)?)
    }

    /// Index the record in this view.
    pub fn add_fs(&self, fs: Addr) -> Result<bool> {
        Ok(self.repository.add_fs(fs)?)
    }

    /// Remove the record from this view's indices.
    pub fn remove_fs(&self, fs: Addr) -> Result<bool> {
        Ok(self.repository.remove_fs(fs)?)
    }

    /// Look up an index at its declared type.
    pub fn get_index(&self, label: &str) -> Result<FsIndex> {
        Ok(self.repository.get_index(label)?)
    }

    /// Look up an index narrowed to a subtype.
    pub fn get_index_for(&self, label: &str, type_code: TypeCode) -> Result<FsIndex> {
        Ok(self.repository.get_index_for(label, type_code)?)
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("repository", &self.repository)
            .finish()
    }
}
