//! # Trellis
//!
//! An in-process, typed feature-structure store for analysis pipelines.
//!
//! ## Overview
//!
//! Trellis holds the typed records ("feature structures") produced while
//! processing one subject of analysis, and keeps them queryable through
//! multiple concurrently-maintained indices per type:
//!
//! - **Records**: Opaque, integer-addressed; the engine compares keys
//!   through a supplied comparator, never record contents
//! - **Indices**: Sorted, set, or bag per label per type, with composite
//!   views over a type and all its subtypes
//! - **Cursors**: Positioned iteration with advisory staleness detection
//!   through shared per-type modification counters
//! - **Pools**: A bounded pool of reusable store instances per pipeline
//!   stage, with strict release-ownership tracking
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis::{
//!     Addr, ComparatorRef, ComponentMetadata, IndexDescriptor, IndexKind, StoreManager,
//!     TuningConfig, TypeDecl,
//! };
//!
//! // Order records by their raw address value.
//! let cmp: ComparatorRef = Arc::new(|a: Addr, b: Addr| a.as_raw().cmp(&b.as_raw()));
//!
//! let manager = StoreManager::new();
//! manager.register_metadata(
//!     ComponentMetadata::new("tokenizer")
//!         .with_type(TypeDecl::root("Top"))
//!         .with_type(TypeDecl::new("Annotation", "Top"))
//!         .with_index(IndexDescriptor::new(
//!             "by-addr",
//!             "Annotation",
//!             IndexKind::Sorted,
//!             cmp,
//!         )),
//! );
//!
//! let tuning = TuningConfig::default();
//! manager.define_store_pool("tokenizer-stage", 2, &tuning).unwrap();
//!
//! let store = manager.acquire("tokenizer-stage").unwrap();
//! let annotation = store.type_system().code_of("Annotation").unwrap();
//! let view = store.initial_view().unwrap();
//!
//! let fs = store.create_fs(annotation).unwrap();
//! view.add_fs(fs).unwrap();
//! assert_eq!(view.get_index("by-addr").unwrap().size(), 1);
//!
//! manager.release(&store).unwrap();
//! ```
//!
//! ## Concurrency model
//!
//! Mutations to one view are single-writer: serialize them externally.
//! Cursors may outlive mutations; staleness is *detected* through the
//! modification-counter protocol, never prevented; check
//! `is_concurrent_modification()` before trusting an old cursor. Pool
//! acquire/release are linearizable and never block.
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `trellis::core` - Addresses, the type lattice, ordering contracts
//! - `trellis::index` - The index engine and cursors
//! - `trellis::store` - Store instances, views, definitions
//! - `trellis::pool` - Pools and the store manager

pub mod error;

// Re-export component crates
pub use trellis_core as core;
pub use trellis_index as index;
pub use trellis_pool as pool;
pub use trellis_store as store;

// Re-export main types for convenience
pub use error::{Result, TrellisError};

// Re-export commonly used types
pub use trellis_core::{
    Addr, ComparatorRef, ComponentMetadata, FsComparator, IndexDescriptor, IndexKind, TypeCode,
    TypeDecl, TypeLattice, TypeOracle,
};
pub use trellis_index::{FsIndex, IndexCursor, IndexRepository};
pub use trellis_pool::{IdentitySizing, SizingPolicy, StoreManager, StorePool};
pub use trellis_store::{Store, StoreDefinition, TuningConfig, View, INITIAL_VIEW};
