//! Search index error types.
//!
//! This module defines the error types that can occur while writing prepared
//! documents to a search index.

use thiserror::Error;

use search_indexer_shared::EntityId;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., empty index name).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the search backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to store an entity.
    #[error("Index error: {0}")]
    IndexError(String),

    /// The target index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Bulk operation failed as a whole.
    #[error("Bulk operation error: {0}")]
    BulkOperationError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// Operation timed out.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index error for a single entity.
    pub fn index(index: &str, entity_id: EntityId, msg: impl AsRef<str>) -> Self {
        Self::IndexError(format!("index={}, entity_id={}: {}", index, entity_id, msg.as_ref()))
    }

    /// Create an index not found error.
    pub fn index_not_found(index: impl Into<String>) -> Self {
        Self::IndexNotFound(index.into())
    }

    /// Create a bulk operation error.
    pub fn bulk_operation(msg: impl Into<String>) -> Self {
        Self::BulkOperationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::Timeout(_) => true,
            Self::BulkOperationError(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("rate limit") || msg.contains("429") || msg.contains("503")
            }
            Self::ValidationError(_)
            | Self::IndexError(_)
            | Self::IndexNotFound(_)
            | Self::BatchSizeExceeded { .. } => false,
        }
    }
}
