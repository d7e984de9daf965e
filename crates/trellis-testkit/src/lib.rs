//! # Trellis Testkit
//!
//! Testing utilities for Trellis.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A ready-made manager with a small annotation-style
//!   lattice, one index of each kind, and the key table their shared
//!   comparator reads
//! - **Generators**: Proptest strategies for index workloads
//!
//! ## Test Fixtures
//!
//! Quickly set up a store with indexable records:
//!
//! ```rust
//! use trellis_testkit::fixtures::{StoreFixture, SORTED_LABEL};
//!
//! let fixture = StoreFixture::new();
//! let store = fixture.new_store();
//! fixture.index_record(&store, "Token", 42);
//!
//! let view = store.initial_view().unwrap();
//! assert_eq!(view.get_index(SORTED_LABEL).unwrap().size(), 1);
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use trellis_testkit::generators::index_ops;
//!
//! proptest! {
//!     #[test]
//!     fn my_property(ops in index_ops(32)) {
//!         // drive a store with the workload
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{ascending_key, KeyTable, StoreFixture, BAG_LABEL, SET_LABEL, SORTED_LABEL};
pub use generators::{index_kind, index_ops, record_key, IndexOp};
