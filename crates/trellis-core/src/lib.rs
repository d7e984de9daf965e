//! # Trellis Core
//!
//! Pure primitives for the Trellis feature-structure store: addresses,
//! the committed type lattice, and the ordering contracts the index
//! engine consumes.
//!
//! This crate contains no I/O and no shared mutable state. It is pure
//! computation over declaration data.
//!
//! ## Key Types
//!
//! - [`Addr`] - Opaque, stable address of one record within a store
//! - [`TypeCode`] - Preorder-assigned code in the committed type lattice
//! - [`TypeLattice`] - The committed type system, built from [`TypeDecl`]s
//! - [`FsComparator`] / [`TypeOracle`] - The contracts an index engine
//!   needs: three-way key ordering and type membership
//! - [`ComponentMetadata`] - What each pipeline component contributes to
//!   the merged store definition

pub mod error;
pub mod lattice;
pub mod metadata;
pub mod order;
pub mod types;

pub use error::CoreError;
pub use lattice::{TypeDecl, TypeLattice};
pub use metadata::{ComponentMetadata, IndexDescriptor};
pub use order::{ComparatorRef, FsComparator, OracleRef, TypeOracle};
pub use types::{Addr, IndexKind, TypeCode};
