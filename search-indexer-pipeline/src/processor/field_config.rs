//! Memoized field configuration lookup.

use std::collections::HashMap;
use std::sync::Arc;

use search_indexer_shared::{
    EntityConfig, FieldAttribute, FieldConfig, FieldType, ALL_TEXT_FIELD, ALL_TEXT_L10N_FIELD,
};
use tracing::trace;

use crate::errors::PipelineError;
use crate::placeholder::FieldNameMatcher;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    config: u64,
    field: String,
    attribute: FieldAttribute,
}

/// Finds the mapping record of a field and remembers it.
///
/// A record matches when it carries the requested attribute and its name
/// equals the field name or matches it through the name matcher. The last
/// matching record wins. Misses are remembered as well.
pub struct FieldConfigCache {
    matcher: Arc<dyn FieldNameMatcher>,
    entries: HashMap<CacheKey, Option<FieldConfig>>,
}

impl FieldConfigCache {
    pub fn new(matcher: Arc<dyn FieldNameMatcher>) -> Self {
        Self {
            matcher,
            entries: HashMap::new(),
        }
    }

    /// Lookups against one configuration; its fingerprint is computed once.
    pub fn for_config<'a>(&'a mut self, config: &'a EntityConfig) -> ConfigLookup<'a> {
        ConfigLookup {
            fingerprint: config.fingerprint(),
            config,
            cache: self,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(
        &mut self,
        config: &EntityConfig,
        fingerprint: u64,
        field: &str,
        attribute: FieldAttribute,
    ) -> Option<&FieldConfig> {
        let key = CacheKey {
            config: fingerprint,
            field: field.to_string(),
            attribute,
        };

        let matcher = &self.matcher;
        self.entries
            .entry(key)
            .or_insert_with(|| {
                let record = config
                    .fields
                    .iter()
                    .filter(|record| record.has_attribute(attribute))
                    .filter(|record| record.name == field || matcher.matches(&record.name, field))
                    .last()
                    .cloned();

                match &record {
                    Some(record) => trace!(
                        field = %field,
                        attribute = %attribute,
                        pattern = %record.name,
                        "Resolved field config"
                    ),
                    None => trace!(field = %field, attribute = %attribute, "No field config"),
                }
                record
            })
            .as_ref()
    }
}

/// Attribute lookups for the fields of one entity configuration.
pub struct ConfigLookup<'a> {
    cache: &'a mut FieldConfigCache,
    config: &'a EntityConfig,
    fingerprint: u64,
}

impl ConfigLookup<'_> {
    /// Configured name of a field, `default` when none is declared.
    pub fn name(&mut self, field: &str, default: &str) -> String {
        self.cache
            .find(self.config, self.fingerprint, field, FieldAttribute::Name)
            .map_or_else(|| default.to_string(), |record| record.name.clone())
    }

    /// Declared type of a field. The all-text aggregates are text even when
    /// undeclared; any other undeclared field is a configuration error.
    pub fn field_type(&mut self, field: &str) -> Result<FieldType, PipelineError> {
        if let Some(field_type) = self
            .cache
            .find(self.config, self.fingerprint, field, FieldAttribute::Type)
            .and_then(|record| record.field_type)
        {
            return Ok(field_type);
        }

        if field == ALL_TEXT_FIELD || field == ALL_TEXT_L10N_FIELD {
            return Ok(FieldType::Text);
        }

        Err(PipelineError::configuration(FieldAttribute::Type, field))
    }

    /// Whether every value of the field feeds the all-text aggregate.
    pub fn all_text(&mut self, field: &str) -> Option<bool> {
        self.cache
            .find(self.config, self.fingerprint, field, FieldAttribute::AllText)
            .and_then(|record| record.all_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::{PlaceholderNameMatcher, PlaceholderRegistry};
    use std::sync::Mutex;

    struct CountingMatcher {
        inner: PlaceholderNameMatcher,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl CountingMatcher {
        fn new() -> Self {
            Self {
                inner: PlaceholderNameMatcher::from_registry(
                    &PlaceholderRegistry::with_defaults(),
                ),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls_for(&self, name: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, n)| n == name)
                .count()
        }
    }

    impl FieldNameMatcher for CountingMatcher {
        fn matches(&self, pattern: &str, name: &str) -> bool {
            self.calls.lock().unwrap().push((pattern.to_string(), name.to_string()));
            self.inner.matches(pattern, name)
        }
    }

    fn config() -> EntityConfig {
        EntityConfig::new("product")
            .with_field(FieldConfig::text("sku").with_all_text(true))
            .with_field(FieldConfig::text("name_LOCALIZATION_ID"))
            .with_field(FieldConfig::new("sku", FieldType::Integer))
    }

    #[test]
    fn test_last_match_wins() {
        let mut cache = FieldConfigCache::new(Arc::new(CountingMatcher::new()));
        let config = config();
        let mut lookup = cache.for_config(&config);

        assert_eq!(lookup.field_type("sku").unwrap(), FieldType::Integer);
        assert_eq!(lookup.all_text("sku"), Some(true));
        assert_eq!(lookup.field_type("name_5").unwrap(), FieldType::Text);
    }

    #[test]
    fn test_records_without_attribute_are_skipped() {
        let mut cache = FieldConfigCache::new(Arc::new(CountingMatcher::new()));
        let config = config();
        let mut lookup = cache.for_config(&config);

        assert_eq!(lookup.all_text("name_LOCALIZATION_ID"), None);
    }

    #[test]
    fn test_reserved_names_and_missing_fields() {
        let mut cache = FieldConfigCache::new(Arc::new(CountingMatcher::new()));
        let config = config();
        let mut lookup = cache.for_config(&config);

        assert_eq!(lookup.field_type(ALL_TEXT_FIELD).unwrap(), FieldType::Text);
        assert_eq!(lookup.field_type(ALL_TEXT_L10N_FIELD).unwrap(), FieldType::Text);
        assert_eq!(lookup.name(ALL_TEXT_FIELD, ALL_TEXT_FIELD), ALL_TEXT_FIELD);

        let error = lookup.field_type("color").unwrap_err();
        assert_eq!(error.to_string(), r#"Missing option "type" for "color" field"#);
    }

    #[test]
    fn test_lookups_are_memoized() {
        let matcher = Arc::new(CountingMatcher::new());
        let mut cache = FieldConfigCache::new(matcher.clone());
        let config = config();

        for _ in 0..3 {
            let mut lookup = cache.for_config(&config);
            assert_eq!(lookup.field_type("name_2").unwrap(), FieldType::Text);
            assert!(lookup.field_type("missing").is_err());
        }

        assert_eq!(matcher.calls_for("name_2"), 3);
        assert_eq!(matcher.calls_for("missing"), 3);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_is_keyed_by_config() {
        let mut cache = FieldConfigCache::new(Arc::new(CountingMatcher::new()));
        let text = EntityConfig::new("product").with_field(FieldConfig::text("weight"));
        let decimal =
            EntityConfig::new("product").with_field(FieldConfig::new("weight", FieldType::Decimal));

        assert_eq!(
            cache.for_config(&text).field_type("weight").unwrap(),
            FieldType::Text
        );
        assert_eq!(
            cache.for_config(&decimal).field_type("weight").unwrap(),
            FieldType::Decimal
        );
        assert_eq!(cache.len(), 2);
    }
}
