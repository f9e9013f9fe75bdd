//! Orchestrator module for the search indexer pipeline.
//!
//! Coordinates the index data provider and the loader for a full
//! indexing run.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::errors::PipelineError;
use crate::loader::SearchLoader;
use crate::processor::IndexDataProvider;
use search_indexer_shared::{EntityId, IndexContext, SearchMapping};

/// What to index: candidate ids per entity class, for the websites listed
/// in the context.
#[derive(Debug, Clone, Default)]
pub struct IndexingRequest {
    pub entities: BTreeMap<String, Vec<EntityId>>,
    pub context: IndexContext,
    /// Drop the existing index content before loading.
    pub reset: bool,
}

impl IndexingRequest {
    pub fn new(context: IndexContext) -> Self {
        Self {
            entities: BTreeMap::new(),
            context,
            reset: false,
        }
    }

    pub fn with_entities(
        mut self,
        entity_class: impl Into<String>,
        entity_ids: impl IntoIterator<Item = EntityId>,
    ) -> Self {
        self.entities
            .entry(entity_class.into())
            .or_default()
            .extend(entity_ids);
        self
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }
}

/// Outcome for one index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub entity_class: String,
    pub website_id: u64,
    pub indexed: usize,
    pub failed: usize,
    /// Candidates restricted out or without data, removed from the index.
    pub removed: usize,
}

/// Outcome of an indexing run, keyed by index name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexingReport {
    pub indexes: BTreeMap<String, IndexReport>,
}

impl IndexingReport {
    pub fn indexed(&self) -> usize {
        self.indexes.values().map(|report| report.indexed).sum()
    }

    pub fn failed(&self) -> usize {
        self.indexes.values().map(|report| report.failed).sum()
    }

    pub fn index(&self, name: &str) -> Option<&IndexReport> {
        self.indexes.get(name)
    }
}

/// Orchestrator that coordinates the pipeline components.
pub struct Orchestrator {
    provider: IndexDataProvider,
    loader: SearchLoader,
    mapping: Arc<SearchMapping>,
}

impl Orchestrator {
    pub fn new(
        provider: IndexDataProvider,
        loader: SearchLoader,
        mapping: Arc<SearchMapping>,
    ) -> Self {
        Self {
            provider,
            loader,
            mapping,
        }
    }

    /// Index the requested entities for every website of the context.
    #[instrument(
        skip(self, request),
        fields(
            websites = request.context.website_ids.len(),
            classes = request.entities.len()
        )
    )]
    pub async fn run(&mut self, request: IndexingRequest) -> Result<IndexingReport, PipelineError> {
        let mut report = IndexingReport::default();

        if request.context.website_ids.is_empty() {
            warn!("No websites to index");
            return Ok(report);
        }

        info!("Starting indexing run");

        for &website_id in &request.context.website_ids {
            let context = self
                .provider
                .collect_context_for_website(website_id, request.context.clone())?;

            for (entity_class, candidates) in &request.entities {
                let (index, index_report) = self
                    .index_entities(entity_class, candidates, &context, request.reset)
                    .await?;
                report.indexes.insert(index, index_report);
            }
        }

        info!(indexed = report.indexed(), failed = report.failed(), "Indexing run complete");
        Ok(report)
    }

    /// Index one entity class for the current website of `context`.
    async fn index_entities(
        &mut self,
        entity_class: &str,
        candidates: &[EntityId],
        context: &IndexContext,
        reset: bool,
    ) -> Result<(String, IndexReport), PipelineError> {
        let mapping = Arc::clone(&self.mapping);
        let entity_config = mapping
            .entity_config(entity_class)
            .ok_or_else(|| PipelineError::EntityNotMapped(entity_class.to_string()))?;

        let index = self
            .provider
            .placeholders()
            .replace_default(&entity_config.index_template(), context);

        let mut context = context.clone();
        context.entity_ids = candidates.to_vec();

        let allowed = self
            .provider
            .get_restricted_entities(entity_class, candidates, &context)?;
        let document = self
            .provider
            .get_entities_data(entity_class, &allowed, &context, entity_config)?;

        if reset {
            self.loader.reset(&index).await?;
        }

        let removed: Vec<EntityId> = candidates
            .iter()
            .copied()
            .filter(|entity_id| document.entity(*entity_id).is_none())
            .collect();
        if !removed.is_empty() && !reset {
            self.loader.delete(&index, &removed).await?;
        }

        let summary = self.loader.load(&index, document).await?;

        let index_report = IndexReport {
            entity_class: entity_class.to_string(),
            website_id: context.current_website_id().unwrap_or_default(),
            indexed: summary.succeeded,
            failed: summary.failed,
            removed: removed.len(),
        };
        info!(
            index = %index,
            indexed = index_report.indexed,
            removed = index_report.removed,
            "Indexed entity class"
        );
        Ok((index, index_report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::MappingAliasResolver;
    use crate::events::ListenerRegistry;
    use crate::placeholder::{PlaceholderNameMatcher, PlaceholderRegistry};
    use search_indexer_repository::{InMemorySearchIndex, SearchIndexClient, SearchIndexProvider};
    use search_indexer_shared::{
        EntityConfig, EntityIndexData, FieldConfig, FieldType, IndexValue, IndexedDocument,
    };

    const PRODUCT: &str = "Acme\\Product";

    fn orchestrator(registry: ListenerRegistry, index: Arc<InMemorySearchIndex>) -> Orchestrator {
        let mapping = Arc::new(
            SearchMapping::new().with_entity(
                PRODUCT,
                EntityConfig::new("product")
                    .with_field(FieldConfig::text("name").with_all_text(true))
                    .with_field(FieldConfig::new("visible_website", FieldType::Integer)),
            ),
        );
        let placeholders = PlaceholderRegistry::with_defaults();
        let matcher = PlaceholderNameMatcher::from_registry(&placeholders);
        let provider = IndexDataProvider::new(
            Arc::new(registry),
            Arc::new(MappingAliasResolver::new(mapping.clone())),
            Arc::new(placeholders),
            Arc::new(matcher),
        );
        let loader = SearchLoader::new(Arc::new(SearchIndexClient::new(index)));

        Orchestrator::new(provider, loader, mapping)
    }

    fn registry() -> ListenerRegistry {
        let mut registry = ListenerRegistry::new();
        registry
            .on_restrict_index_entity_for("product", |event| {
                // Product 3 is only visible on website 1.
                if event.context().current_website_id() != Some(1) {
                    event.restriction_mut().exclude([3]);
                }
                Ok(())
            })
            .on_index_entity(|event| {
                let website_id = event.context().current_website_id().unwrap_or_default() as i64;
                let entity_ids = event.entity_ids().to_vec();
                for entity_id in entity_ids {
                    event.add_field(entity_id, "name", format!("Product {}", entity_id), false);
                    event.add_field(entity_id, "visible_website", website_id, false);
                }
                Ok(())
            });
        registry
    }

    #[tokio::test]
    async fn test_run_per_website() {
        let index = Arc::new(InMemorySearchIndex::new());
        let mut orchestrator = orchestrator(registry(), index.clone());

        let request = IndexingRequest::new(IndexContext::new().with_website_ids([1, 2]))
            .with_entities(PRODUCT, [1, 2, 3]);
        let report = orchestrator.run(request).await.unwrap();

        assert_eq!(report.indexed(), 5);
        assert_eq!(report.index("product_2").unwrap().removed, 1);
        assert_eq!(index.count("product_1").await, 3);
        assert_eq!(index.count("product_2").await, 2);

        let stored = index.entity("product_2", 1).await.unwrap();
        assert_eq!(
            stored.data[&FieldType::Text]["all_text"],
            IndexValue::text("Product 1")
        );
        assert_eq!(stored.data[&FieldType::Integer]["visible_website"], IndexValue::from(2_i64));
    }

    #[tokio::test]
    async fn test_restricted_entities_are_removed() {
        let index = Arc::new(InMemorySearchIndex::new());
        let stale: IndexedDocument = [1, 3]
            .into_iter()
            .map(|id| (id, EntityIndexData::new()))
            .collect();
        index.save_entities("product_2", &stale).await.unwrap();

        let mut orchestrator = orchestrator(registry(), index.clone());
        let request = IndexingRequest::new(IndexContext::new().with_website_ids([2]))
            .with_entities(PRODUCT, [1, 3]);
        let report = orchestrator.run(request).await.unwrap();

        assert_eq!(report.indexed(), 1);
        assert_eq!(report.index("product_2").unwrap().removed, 1);
        assert!(index.entity("product_2", 1).await.is_some());
        assert!(index.entity("product_2", 3).await.is_none());
    }

    #[tokio::test]
    async fn test_reset_drops_previous_content() {
        let index = Arc::new(InMemorySearchIndex::new());
        let stale: IndexedDocument = [7]
            .into_iter()
            .map(|id| (id, EntityIndexData::new()))
            .collect();
        index.save_entities("product_1", &stale).await.unwrap();

        let mut orchestrator = orchestrator(registry(), index.clone());
        let request = IndexingRequest::new(IndexContext::new().with_website_ids([1]))
            .with_entities(PRODUCT, [1])
            .with_reset(true);
        orchestrator.run(request).await.unwrap();

        assert_eq!(index.count("product_1").await, 1);
        assert!(index.entity("product_1", 7).await.is_none());
    }

    #[tokio::test]
    async fn test_unmapped_class_fails() {
        let index = Arc::new(InMemorySearchIndex::new());
        let mut orchestrator = orchestrator(registry(), index);

        let request = IndexingRequest::new(IndexContext::new().with_website_ids([1]))
            .with_entities("Acme\\Unknown", [1]);
        let result = orchestrator.run(request).await;

        assert!(matches!(result, Err(PipelineError::EntityNotMapped(_))));
    }

    #[tokio::test]
    async fn test_no_websites_is_noop() {
        let index = Arc::new(InMemorySearchIndex::new());
        let mut orchestrator = orchestrator(registry(), index.clone());

        let report = orchestrator
            .run(IndexingRequest::new(IndexContext::new()).with_entities(PRODUCT, [1]))
            .await
            .unwrap();

        assert_eq!(report, IndexingReport::default());
        assert!(index.index_names().await.is_empty());
    }
}
