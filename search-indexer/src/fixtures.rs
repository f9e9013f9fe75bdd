//! Field values collected ahead of time and replayed through the
//! indexing events.
//!
//! A fixture file looks like:
//!
//! ```json
//! {
//!     "context": { "CURRENCY": "USD" },
//!     "entities": {
//!         "Acme\\Product": {
//!             "1": { "sku": { "value": "RS-1", "all_text": true } }
//!         }
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::IndexingError;
use search_indexer_pipeline::events::IndexEntityEvent;
use search_indexer_pipeline::{IndexingRequest, ListenerRegistry, PipelineError};
use search_indexer_shared::{EntitiesData, EntityId, IndexContext};

/// Fixture values keyed by entity class.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixtures {
    /// Values added to the context of every website.
    #[serde(default)]
    pub context: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub entities: BTreeMap<String, EntitiesData>,
}

impl Fixtures {
    pub fn from_json_str(json: &str) -> Result<Self, IndexingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IndexingError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Every fixture entity becomes an indexing candidate.
    pub fn request(&self, website_ids: &[u64]) -> IndexingRequest {
        let context = IndexContext::new().with_website_ids(website_ids.iter().copied());
        self.entities
            .iter()
            .fold(IndexingRequest::new(context), |request, (entity_class, data)| {
                request.with_entities(entity_class.as_str(), data.keys().copied())
            })
    }

    /// Register listeners that fill the context and the entity fields from
    /// the fixtures.
    pub fn register(self: Arc<Self>, registry: &mut ListenerRegistry) {
        let context = Arc::clone(&self);
        registry.on_collect_context(move |event| {
            for (key, value) in &context.context {
                event.context_mut().set(key.as_str(), value.clone());
            }
            Ok(())
        });
        registry.on_index_entity(move |event| self.fill(event));
    }

    fn fill(&self, event: &mut IndexEntityEvent) -> Result<(), PipelineError> {
        let Some(data) = self.entities.get(event.entity_class()) else {
            return Ok(());
        };

        let entity_ids: Vec<EntityId> = event.entity_ids().to_vec();
        for entity_id in entity_ids {
            let Some(fields) = data.get(&entity_id) else {
                continue;
            };
            for field in fields.iter() {
                for entry in &field.entries {
                    event.add_field(entity_id, &field.name, entry.value.clone(), entry.all_text);
                }
            }
        }

        debug!(
            entity_class = %event.entity_class(),
            entities = event.entities_data().len(),
            "Filled fixture fields"
        );
        Ok(())
    }
}
