//! Dependency initialization and wiring for the search indexer.

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::fixtures::Fixtures;
use crate::IndexingError;
use search_indexer_pipeline::{
    HtmlTagHelper, IndexDataProvider, IndexingRequest, ListenerRegistry, MappingAliasResolver,
    Orchestrator, PlaceholderNameMatcher, PlaceholderRegistry, SearchLoader,
};
use search_indexer_repository::{InMemorySearchIndex, SearchIndexClient, SearchIndexConfig};
use search_indexer_shared::SearchMapping;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
    /// The index the orchestrator writes to.
    pub index: Arc<InMemorySearchIndex>,
    /// Every fixture entity for every configured website.
    pub request: IndexingRequest,
}

impl Dependencies {
    /// Load the mapping and fixtures named by `settings` and wire the
    /// pipeline around them.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If a file cannot be loaded or the index is unhealthy
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            mapping_path = %settings.mapping_path.display(),
            data_path = %settings.data_path.display(),
            website_ids = ?settings.website_ids,
            "Initializing dependencies"
        );

        let mapping = SearchMapping::from_path(&settings.mapping_path)?;
        let fixtures = Fixtures::from_path(&settings.data_path)?;

        Self::from_parts(settings, mapping, fixtures).await
    }

    /// Wire the pipeline around an already loaded mapping and fixtures.
    pub async fn from_parts(
        settings: &Settings,
        mapping: SearchMapping,
        fixtures: Fixtures,
    ) -> Result<Self, IndexingError> {
        let mapping = Arc::new(mapping);
        let fixtures = Arc::new(fixtures);
        let request = fixtures.request(&settings.website_ids);

        let mut registry = ListenerRegistry::new();
        fixtures.register(&mut registry);

        let placeholders = PlaceholderRegistry::with_defaults();
        let matcher = PlaceholderNameMatcher::from_registry(&placeholders);
        let provider = IndexDataProvider::new(
            Arc::new(registry),
            Arc::new(MappingAliasResolver::new(Arc::clone(&mapping))),
            Arc::new(placeholders),
            Arc::new(matcher),
        )
        .with_html_helper(HtmlTagHelper::new(settings.long_word_limit));

        let index = Arc::new(InMemorySearchIndex::new());
        let client = SearchIndexClient::with_config(
            index.clone(),
            SearchIndexConfig::with_max_batch_size(settings.max_batch_size),
        );

        if settings.loader_batch_size > settings.max_batch_size {
            return Err(IndexingError::config(format!(
                "Loader batch size {} exceeds the index batch limit {}",
                settings.loader_batch_size, settings.max_batch_size
            )));
        }
        let loader = SearchLoader::with_config(Arc::new(client), settings.loader_config());

        if !loader.health_check().await? {
            return Err(IndexingError::config("Search index is unhealthy"));
        }

        info!(
            entity_classes = mapping.entity_classes().count(),
            candidates = request.entities.values().map(Vec::len).sum::<usize>(),
            "Search index ready"
        );

        let orchestrator = Orchestrator::new(provider, loader, mapping);

        Ok(Self {
            orchestrator,
            index,
            request,
        })
    }
}
