//! In-memory search index.
//!
//! Keeps stored entities per index name. Used by the indexer binary and
//! in tests in place of a real search engine.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationResult, BatchOperationSummary, StoredEntity};
use search_indexer_shared::{EntityId, IndexedDocument};

#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    indexes: RwLock<HashMap<String, BTreeMap<EntityId, StoredEntity>>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entity(&self, index: &str, entity_id: EntityId) -> Option<StoredEntity> {
        self.indexes.read().await.get(index)?.get(&entity_id).cloned()
    }

    pub async fn count(&self, index: &str) -> usize {
        self.indexes.read().await.get(index).map_or(0, BTreeMap::len)
    }

    pub async fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// JSON snapshot of one index: `{ "<entity id>": { "<type>": { ... } } }`.
    pub async fn to_json(&self, index: &str) -> Result<serde_json::Value, SearchIndexError> {
        let indexes = self.indexes.read().await;
        let entities = indexes
            .get(index)
            .ok_or_else(|| SearchIndexError::index_not_found(index))?;

        let snapshot: BTreeMap<&EntityId, _> = entities
            .iter()
            .map(|(id, stored)| (id, &stored.data))
            .collect();
        serde_json::to_value(snapshot).map_err(|e| {
            SearchIndexError::bulk_operation(format!("Failed to serialize index {}: {}", index, e))
        })
    }
}

#[async_trait]
impl SearchIndexProvider for InMemorySearchIndex {
    async fn save_entities(
        &self,
        index: &str,
        document: &IndexedDocument,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut indexes = self.indexes.write().await;
        let entities = indexes.entry(index.to_string()).or_default();

        let summary: BatchOperationSummary = document
            .iter()
            .map(|(entity_id, data)| {
                entities.insert(entity_id, StoredEntity::new(entity_id, data.clone()));
                BatchOperationResult::succeeded(entity_id)
            })
            .collect();

        debug!(index = %index, count = summary.succeeded, "Stored entities in memory");
        Ok(summary)
    }

    async fn delete_entities(
        &self,
        index: &str,
        entity_ids: &[EntityId],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let mut indexes = self.indexes.write().await;
        if let Some(entities) = indexes.get_mut(index) {
            for entity_id in entity_ids {
                entities.remove(entity_id);
            }
        }

        Ok(entity_ids
            .iter()
            .map(|entity_id| BatchOperationResult::succeeded(*entity_id))
            .collect())
    }

    async fn reset_index(&self, index: &str) -> Result<(), SearchIndexError> {
        self.indexes.write().await.remove(index);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_indexer_shared::{EntityIndexData, FieldType, IndexValue};

    fn document(ids: &[EntityId]) -> IndexedDocument {
        ids.iter()
            .map(|id| {
                let mut integer = BTreeMap::new();
                integer.insert("id".to_string(), IndexValue::from(*id as i64));
                let mut data = EntityIndexData::new();
                data.insert(FieldType::Integer, integer);
                (*id, data)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_save_replaces_entities() {
        let store = InMemorySearchIndex::new();

        store.save_entities("product_1", &document(&[1, 2])).await.unwrap();
        store.save_entities("product_1", &document(&[2, 3])).await.unwrap();

        assert_eq!(store.count("product_1").await, 3);
        assert_eq!(store.count("product_2").await, 0);

        let stored = store.entity("product_1", 2).await.unwrap();
        assert_eq!(stored.data[&FieldType::Integer]["id"], IndexValue::from(2_i64));
    }

    #[tokio::test]
    async fn test_delete_and_reset() {
        let store = InMemorySearchIndex::new();
        store.save_entities("product_1", &document(&[1, 2])).await.unwrap();
        store.save_entities("brand_1", &document(&[1])).await.unwrap();

        let summary = store.delete_entities("product_1", &[1, 99]).await.unwrap();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(store.count("product_1").await, 1);

        store.reset_index("product_1").await.unwrap();
        assert_eq!(store.index_names().await, vec!["brand_1".to_string()]);
    }

    #[tokio::test]
    async fn test_to_json() {
        let store = InMemorySearchIndex::new();
        store.save_entities("product_1", &document(&[7])).await.unwrap();

        let json = store.to_json("product_1").await.unwrap();
        assert_eq!(json, serde_json::json!({ "7": { "integer": { "id": 7 } } }));

        assert!(matches!(
            store.to_json("missing").await,
            Err(SearchIndexError::IndexNotFound(_))
        ));
    }
}
