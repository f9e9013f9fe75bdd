//! Search index client implementation.
//!
//! This module provides the client the indexer writes prepared documents
//! through. It validates requests before handing them to the provider.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::BatchOperationSummary;
use search_indexer_shared::{EntityId, IndexedDocument};

/// The main client for writing to the search index.
pub struct SearchIndexClient {
    provider: Arc<dyn SearchIndexProvider>,
    config: SearchIndexConfig,
}

impl SearchIndexClient {
    /// Create a new SearchIndexClient with default configuration.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create a new SearchIndexClient with custom configuration.
    pub fn with_config(provider: Arc<dyn SearchIndexProvider>, config: SearchIndexConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &SearchIndexConfig {
        &self.config
    }

    fn validate_index(index: &str) -> Result<(), SearchIndexError> {
        if index.trim().is_empty() {
            return Err(SearchIndexError::validation("index name is required"));
        }
        Ok(())
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Save all entities of a prepared document.
    ///
    /// The number of entities is limited by the configured max_batch_size
    /// (default: 1000). Individual failures are reported in the summary.
    #[instrument(skip(self, document), fields(entity_count = document.len()))]
    pub async fn save(
        &self,
        index: &str,
        document: &IndexedDocument,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        Self::validate_index(index)?;

        if document.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        self.validate_batch_size(document.len())?;

        let summary = self.provider.save_entities(index, document).await?;
        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Saved entities"
        );
        Ok(summary)
    }

    /// Delete entities from an index.
    pub async fn delete(
        &self,
        index: &str,
        entity_ids: &[EntityId],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        Self::validate_index(index)?;

        if entity_ids.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        self.validate_batch_size(entity_ids.len())?;

        self.provider.delete_entities(index, entity_ids).await
    }

    /// Drop every entity of an index.
    pub async fn reset(&self, index: &str) -> Result<(), SearchIndexError> {
        Self::validate_index(index)?;
        self.provider.reset_index(index).await
    }

    pub async fn health_check(&self) -> Result<bool, SearchIndexError> {
        self.provider.health_check().await
    }
}
