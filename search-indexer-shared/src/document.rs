//! Structured index documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::FieldType;
use crate::raw::EntityId;
use crate::value::IndexValue;

/// Stored values of one entity, grouped by field type then field name.
pub type EntityIndexData = BTreeMap<FieldType, BTreeMap<String, IndexValue>>;

/// Prepared index data for a batch of entities.
///
/// Built once per indexing call and handed to the index writer as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexedDocument {
    entities: BTreeMap<EntityId, EntityIndexData>,
}

impl IndexedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_entity(&mut self, entity_id: EntityId, data: EntityIndexData) {
        self.entities.insert(entity_id, data);
    }

    pub fn entity(&self, entity_id: EntityId) -> Option<&EntityIndexData> {
        self.entities.get(&entity_id)
    }

    pub fn get(
        &self,
        entity_id: EntityId,
        field_type: FieldType,
        name: &str,
    ) -> Option<&IndexValue> {
        self.entities.get(&entity_id)?.get(&field_type)?.get(name)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityIndexData)> {
        self.entities.iter().map(|(id, data)| (*id, data))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Split into documents of at most `size` entities, preserving id order.
    pub fn into_chunks(self, size: usize) -> Vec<IndexedDocument> {
        let size = size.max(1);
        let mut chunks = Vec::with_capacity(self.entities.len().div_ceil(size));
        let mut current = IndexedDocument::new();

        for (entity_id, data) in self.entities {
            current.insert_entity(entity_id, data);
            if current.len() == size {
                chunks.push(std::mem::take(&mut current));
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    pub fn into_entities(self) -> BTreeMap<EntityId, EntityIndexData> {
        self.entities
    }
}

impl FromIterator<(EntityId, EntityIndexData)> for IndexedDocument {
    fn from_iter<I: IntoIterator<Item = (EntityId, EntityIndexData)>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}
