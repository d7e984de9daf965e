//! # Trellis Store
//!
//! The store instance layer: the merged [`StoreDefinition`] every
//! instance is built from, the [`Store`] itself (address allocation,
//! named [`View`]s, reset-for-reuse), and the [`TuningConfig`] hints.
//!
//! A store holds one subject of analysis at a time. Construction is
//! expensive (materializing the committed type system dominates), so
//! instances are pooled by the manager layer and reset between subjects
//! rather than rebuilt.

pub mod config;
pub mod definition;
pub mod error;
pub mod store;
pub mod view;

pub use config::TuningConfig;
pub use definition::StoreDefinition;
pub use error::{Result, StoreError};
pub use store::{Store, StoreOracle, INITIAL_VIEW};
pub use view::View;
