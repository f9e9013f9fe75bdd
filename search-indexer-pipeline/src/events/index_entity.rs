//! Field collection event.

use std::collections::BTreeMap;

use search_indexer_shared::{
    EntitiesData, EntityId, IndexContext, IndexValue, PlaceholderValue, RawFieldEntry, RawValue,
};

/// Carries the raw field values collectors emit for a batch of entities.
#[derive(Debug, Clone)]
pub struct IndexEntityEvent {
    entity_class: String,
    entity_ids: Vec<EntityId>,
    context: IndexContext,
    entities_data: EntitiesData,
}

impl IndexEntityEvent {
    pub fn new(
        entity_class: impl Into<String>,
        entity_ids: Vec<EntityId>,
        context: IndexContext,
    ) -> Self {
        Self {
            entity_class: entity_class.into(),
            entity_ids,
            context,
            entities_data: EntitiesData::new(),
        }
    }

    pub fn entity_class(&self) -> &str {
        &self.entity_class
    }

    /// Entities being indexed in this batch.
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.entity_ids
    }

    pub fn context(&self) -> &IndexContext {
        &self.context
    }

    /// Add a value for `field_name`. Repeated calls for the same field
    /// accumulate; the aggregator merges them.
    pub fn add_field(
        &mut self,
        entity_id: EntityId,
        field_name: &str,
        value: impl Into<RawValue>,
        add_to_all_text: bool,
    ) -> &mut Self {
        self.entities_data
            .entry(entity_id)
            .or_default()
            .push(field_name, RawFieldEntry::new(value, add_to_all_text));
        self
    }

    /// Add a value whose field name contains placeholder tokens, e.g.
    /// `name_LOCALIZATION_ID` with `{"LOCALIZATION_ID": "2"}`.
    pub fn add_placeholder_field(
        &mut self,
        entity_id: EntityId,
        field_name: &str,
        value: impl Into<IndexValue>,
        placeholders: BTreeMap<String, String>,
        add_to_all_text: bool,
    ) -> &mut Self {
        let value = PlaceholderValue {
            value: value.into(),
            placeholders,
        };
        self.add_field(entity_id, field_name, value, add_to_all_text)
    }

    pub fn remove_entity_data(&mut self, entity_id: EntityId) {
        self.entities_data.remove(&entity_id);
    }

    pub fn remove_field(&mut self, entity_id: EntityId, field_name: &str) {
        if let Some(fields) = self.entities_data.get_mut(&entity_id) {
            fields.remove(field_name);
        }
    }

    pub fn entities_data(&self) -> &EntitiesData {
        &self.entities_data
    }

    pub fn into_entities_data(self) -> EntitiesData {
        self.entities_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_fields() {
        let mut event = IndexEntityEvent::new("Acme\\Product", vec![1, 2], IndexContext::new());

        event
            .add_field(1, "sku", "RS-1", true)
            .add_field(1, "sku", "RS-1-B", true)
            .add_field(2, "price", 9.5, false);

        let mut placeholders = BTreeMap::new();
        placeholders.insert("LOCALIZATION_ID".to_string(), "2".to_string());
        event.add_placeholder_field(1, "name_LOCALIZATION_ID", "Rot", placeholders.clone(), true);

        let data = event.entities_data();
        assert_eq!(data.len(), 2);
        assert_eq!(data[&1].get("sku").unwrap().entries.len(), 2);
        assert_eq!(
            data[&1].get("name_LOCALIZATION_ID").unwrap().entries[0].value,
            RawValue::Placeholder(PlaceholderValue {
                value: IndexValue::text("Rot"),
                placeholders,
            })
        );
        assert!(!data[&2].get("price").unwrap().entries[0].all_text);
    }

    #[test]
    fn test_remove_data() {
        let mut event = IndexEntityEvent::new("Acme\\Product", vec![1, 2], IndexContext::new());
        event.add_field(1, "sku", "RS-1", false).add_field(1, "name", "Shirt", false);
        event.add_field(2, "sku", "RS-2", false);

        event.remove_field(1, "sku");
        event.remove_entity_data(2);

        let data = event.into_entities_data();
        assert_eq!(data.len(), 1);
        assert!(data[&1].get("sku").is_none());
        assert!(data[&1].get("name").is_some());
    }
}
