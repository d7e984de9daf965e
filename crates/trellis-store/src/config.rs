//! Tuning settings for store instances.

use trellis_index::DEFAULT_INITIAL_CAPACITY;

/// Performance tuning for a store instance.
///
/// These are hints, not limits: the capacity hint is what each index
/// shrinks back to on flush, bounding memory retained after a burst.
#[derive(Debug, Clone)]
pub struct TuningConfig {
    /// Initial capacity of each index container, and the size flushed
    /// indices shrink back to if they grew beyond it.
    pub initial_index_capacity: usize,
    /// Whether `create_fs` checks the type code against the committed
    /// lattice. Disable only for trusted callers on hot paths.
    pub validate_types_on_create: bool,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            initial_index_capacity: DEFAULT_INITIAL_CAPACITY,
            validate_types_on_create: true,
        }
    }
}
