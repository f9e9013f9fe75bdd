//! Configuration types for the SearchIndexClient.

/// Default upper bound of entities written in one call.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Configuration for the SearchIndexClient.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Maximum number of entities accepted in a single save or delete call.
    /// `None` disables the check.
    pub max_batch_size: Option<usize>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(DEFAULT_MAX_BATCH_SIZE),
        }
    }
}

impl SearchIndexConfig {
    /// Accept batches of any size.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }
}
