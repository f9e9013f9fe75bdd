//! Entity class to alias resolution.

use std::sync::Arc;

use search_indexer_shared::SearchMapping;

use crate::errors::PipelineError;

/// Resolves the short alias of an entity class.
pub trait EntityAliasResolver: Send + Sync {
    fn get_alias(&self, entity_class: &str) -> Result<String, PipelineError>;
}

/// Resolves aliases from the search mapping.
#[derive(Debug, Clone)]
pub struct MappingAliasResolver {
    mapping: Arc<SearchMapping>,
}

impl MappingAliasResolver {
    pub fn new(mapping: Arc<SearchMapping>) -> Self {
        Self { mapping }
    }
}

impl EntityAliasResolver for MappingAliasResolver {
    fn get_alias(&self, entity_class: &str) -> Result<String, PipelineError> {
        self.mapping
            .entity_config(entity_class)
            .map(|config| config.alias.clone())
            .ok_or_else(|| PipelineError::AliasNotFound(entity_class.to_string()))
    }
}
