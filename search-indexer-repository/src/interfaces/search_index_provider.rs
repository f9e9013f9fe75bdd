//! Search index provider trait definition.
//!
//! This module defines the abstract interface the indexer writes prepared
//! documents through, so backends can be swapped (a real engine, the
//! in-memory store, test mocks).

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;
use search_indexer_shared::{EntityId, IndexedDocument};

/// Abstracts the underlying search index implementation.
///
/// Implementations are injected into `SearchIndexClient`. Index names are
/// already resolved (placeholders replaced) when they reach the provider.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Store every entity of `document` in `index`, replacing existing
    /// entries with the same id.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-entity outcome
    /// * `Err(SearchIndexError)` - If the operation failed as a whole
    async fn save_entities(
        &self,
        index: &str,
        document: &IndexedDocument,
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Remove entities from `index`. Missing entities count as deleted.
    async fn delete_entities(
        &self,
        index: &str,
        entity_ids: &[EntityId],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Drop all entities of `index`.
    async fn reset_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
