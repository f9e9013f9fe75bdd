//! Loader module for the search indexer pipeline.
//!
//! Writes prepared documents to the search index in batches.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use search_indexer_repository::{BatchOperationSummary, SearchIndexClient, SearchIndexError};
use search_indexer_shared::{EntityId, IndexedDocument};

/// Configuration for the search loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of entities written per request.
    pub batch_size: usize,
    /// Maximum number of retry attempts for failed writes.
    pub max_retries: u32,
    /// Initial retry delay in milliseconds.
    pub initial_retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds.
    pub max_retry_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_retries: 3,
            initial_retry_delay_ms: 100,
            max_retry_delay_ms: 5000,
        }
    }
}

/// Loader that writes documents into the search index.
pub struct SearchLoader {
    client: Arc<SearchIndexClient>,
    config: LoaderConfig,
}

impl SearchLoader {
    /// Create a new search loader with the given client.
    pub fn new(client: Arc<SearchIndexClient>) -> Self {
        Self::with_config(client, LoaderConfig::default())
    }

    /// Create a new search loader with custom configuration.
    pub fn with_config(client: Arc<SearchIndexClient>, config: LoaderConfig) -> Self {
        Self {
            client,
            config: LoaderConfig {
                batch_size: config.batch_size.max(1),
                ..config
            },
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Save a document in chunks of `batch_size` entities.
    ///
    /// Failed entities are reported in the summary; a chunk that still
    /// fails after retrying aborts the load.
    #[instrument(skip(self, document), fields(entity_count = document.len()))]
    pub async fn load(
        &self,
        index: &str,
        document: IndexedDocument,
    ) -> Result<BatchOperationSummary, PipelineError> {
        let mut summary = BatchOperationSummary::empty();
        if document.is_empty() {
            return Ok(summary);
        }

        for chunk in document.into_chunks(self.config.batch_size) {
            let result = self.save_with_retry(index, &chunk).await.map_err(|e| {
                error!(error = %e, count = chunk.len(), "Failed to save entities");
                PipelineError::from(e)
            })?;
            summary.merge(result);
        }

        if summary.is_success() {
            info!(index = %index, count = summary.succeeded, "Loaded entities");
        } else {
            warn!(
                index = %index,
                succeeded = summary.succeeded,
                failed = summary.failed,
                failed_ids = ?summary.failed_ids(),
                "Some entities failed to load"
            );
        }
        Ok(summary)
    }

    /// Remove entities from the index.
    #[instrument(skip(self, entity_ids), fields(entity_count = entity_ids.len()))]
    pub async fn delete(
        &self,
        index: &str,
        entity_ids: &[EntityId],
    ) -> Result<BatchOperationSummary, PipelineError> {
        let mut summary = BatchOperationSummary::empty();
        for chunk in entity_ids.chunks(self.config.batch_size) {
            match self.client.delete(index, chunk).await {
                Ok(result) => summary.merge(result),
                // A missing index has nothing to delete.
                Err(SearchIndexError::IndexNotFound(_)) => {
                    debug!(index = %index, "Index not found, nothing to delete");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(summary)
    }

    /// Drop every entity of the index.
    pub async fn reset(&self, index: &str) -> Result<(), PipelineError> {
        info!(index = %index, "Resetting index");
        self.client.reset(index).await.map_err(PipelineError::from)
    }

    /// Check if the search index is healthy.
    pub async fn health_check(&self) -> Result<bool, PipelineError> {
        self.client
            .health_check()
            .await
            .map_err(|e| PipelineError::loader(e.to_string()))
    }

    /// Save a chunk with exponential backoff retry on transient errors.
    async fn save_with_retry(
        &self,
        index: &str,
        chunk: &IndexedDocument,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut delay_ms = self.config.initial_retry_delay_ms;
        let mut attempt = 0;

        loop {
            match self.client.save(index, chunk).await {
                Ok(summary) => {
                    if attempt > 0 {
                        info!(attempt = attempt, count = chunk.len(), "Save succeeded after retry");
                    }
                    return Ok(summary);
                }
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        attempt = attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Save failed, retrying"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = std::cmp::min(delay_ms * 2, self.config.max_retry_delay_ms);
                }
                Err(e) => {
                    debug!(error = %e, attempt = attempt, "Giving up on save");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_indexer_repository::{BatchOperationResult, InMemorySearchIndex, SearchIndexProvider};
    use search_indexer_shared::{EntityIndexData, FieldType, IndexValue};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that fails a number of times before succeeding.
    struct FlakyProvider {
        failures: usize,
        transient: bool,
        calls: AtomicUsize,
        batch_sizes: tokio::sync::Mutex<Vec<usize>>,
    }

    impl FlakyProvider {
        fn new(failures: usize, transient: bool) -> Self {
            Self {
                failures,
                transient,
                calls: AtomicUsize::new(0),
                batch_sizes: tokio::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchIndexProvider for FlakyProvider {
        async fn save_entities(
            &self,
            _index: &str,
            document: &IndexedDocument,
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(if self.transient {
                    SearchIndexError::connection("connection reset")
                } else {
                    SearchIndexError::validation("bad document")
                });
            }
            self.batch_sizes.lock().await.push(document.len());
            Ok(document.entity_ids().map(BatchOperationResult::succeeded).collect())
        }

        async fn delete_entities(
            &self,
            index: &str,
            _entity_ids: &[EntityId],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            Err(SearchIndexError::index_not_found(index))
        }

        async fn reset_index(&self, _index: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchIndexError> {
            Ok(true)
        }
    }

    fn document(count: u64) -> IndexedDocument {
        (1..=count)
            .map(|id| {
                let mut data = EntityIndexData::new();
                data.entry(FieldType::Text)
                    .or_insert_with(BTreeMap::new)
                    .insert("name".to_string(), IndexValue::text(format!("Product {}", id)));
                (id, data)
            })
            .collect()
    }

    fn loader(provider: Arc<dyn SearchIndexProvider>, batch_size: usize) -> SearchLoader {
        SearchLoader::with_config(
            Arc::new(SearchIndexClient::new(provider)),
            LoaderConfig {
                batch_size,
                ..LoaderConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_load_in_chunks() {
        let provider = Arc::new(FlakyProvider::new(0, true));
        let loader = loader(provider.clone(), 2);

        let summary = loader.load("product_1", document(5)).await.unwrap();

        assert_eq!(summary.total, 5);
        assert!(summary.is_success());
        assert_eq!(*provider.batch_sizes.lock().await, vec![2, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_transient_errors() {
        let provider = Arc::new(FlakyProvider::new(2, true));
        let loader = loader(provider.clone(), 10);

        let summary = loader.load("product_1", document(3)).await.unwrap();

        assert_eq!(summary.succeeded, 3);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_give_up_after_max_retries() {
        let provider = Arc::new(FlakyProvider::new(10, true));
        let loader = loader(provider.clone(), 10);

        let result = loader.load("product_1", document(1)).await;

        assert!(matches!(
            result,
            Err(PipelineError::SearchIndex(SearchIndexError::ConnectionError(_)))
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_no_retry_on_permanent_errors() {
        let provider = Arc::new(FlakyProvider::new(1, false));
        let loader = loader(provider.clone(), 10);

        let result = loader.load("product_1", document(1)).await;

        assert!(matches!(
            result,
            Err(PipelineError::SearchIndex(SearchIndexError::ValidationError(_)))
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_index_is_ok() {
        let loader = loader(Arc::new(FlakyProvider::new(0, true)), 10);

        let summary = loader.delete("product_1", &[1, 2]).await.unwrap();
        assert_eq!(summary.total, 0);
    }

    #[tokio::test]
    async fn test_load_delete_reset_in_memory() {
        let index = Arc::new(InMemorySearchIndex::new());
        let loader = loader(index.clone(), 2);

        loader.load("product_1", document(3)).await.unwrap();
        assert_eq!(index.count("product_1").await, 3);

        loader.delete("product_1", &[1]).await.unwrap();
        assert_eq!(index.count("product_1").await, 2);

        loader.reset("product_1").await.unwrap();
        assert_eq!(index.count("product_1").await, 0);
        assert!(loader.health_check().await.unwrap());
    }
}
