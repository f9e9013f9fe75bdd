//! Indexing context passed through every indexing event.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::raw::EntityId;

/// Options of one indexing run.
///
/// `current_website_id` is set by the indexer for each website in turn and
/// should not be provided by callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexContext {
    #[serde(default)]
    pub website_ids: Vec<u64>,
    #[serde(default)]
    pub entity_ids: Vec<EntityId>,
    #[serde(default)]
    pub field_groups: Vec<String>,
    #[serde(default)]
    current_website_id: Option<u64>,
    /// Values contributed by context collectors.
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl IndexContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_website_ids(mut self, website_ids: impl IntoIterator<Item = u64>) -> Self {
        self.website_ids = website_ids.into_iter().collect();
        self
    }

    pub fn with_entity_ids(mut self, entity_ids: impl IntoIterator<Item = EntityId>) -> Self {
        self.entity_ids = entity_ids.into_iter().collect();
        self
    }

    pub fn with_field_groups<S: Into<String>>(
        mut self,
        groups: impl IntoIterator<Item = S>,
    ) -> Self {
        self.field_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn current_website_id(&self) -> Option<u64> {
        self.current_website_id
    }

    pub fn set_current_website(&mut self, website_id: u64) {
        self.current_website_id = Some(website_id);
    }

    /// Whether the run is limited to a subset of field groups.
    pub fn has_field_group(&self, group: &str) -> bool {
        self.field_groups.is_empty() || self.field_groups.iter().any(|g| g == group)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.extra.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_website() {
        let mut context = IndexContext::new().with_website_ids([1, 2]);
        assert_eq!(context.current_website_id(), None);

        context.set_current_website(2);
        assert_eq!(context.current_website_id(), Some(2));
        assert_eq!(context.website_ids, vec![1, 2]);
    }

    #[test]
    fn test_field_groups() {
        let context = IndexContext::new();
        assert!(context.has_field_group("main"));

        let context = context.with_field_groups(["image"]);
        assert!(context.has_field_group("image"));
        assert!(!context.has_field_group("main"));
    }

    #[test]
    fn test_extra_values() {
        let mut context = IndexContext::new();
        context.set("localizations", serde_json::json!([1, 2]));
        assert_eq!(context.get("localizations"), Some(&serde_json::json!([1, 2])));
    }
}
