//! Search mapping configuration.
//!
//! A [`SearchMapping`] describes, per entity class, the alias used for its
//! index and the fields collectors may emit. Field names can contain
//! placeholder tokens such as `name_LOCALIZATION_ID`.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Integer,
    Decimal,
    Datetime,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Datetime => "datetime",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute of a field record that can be looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAttribute {
    Name,
    Type,
    AllText,
}

impl FieldAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::AllText => "all_text",
        }
    }
}

impl fmt::Display for FieldAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field record of an entity mapping.
///
/// Records without a given attribute are ignored when that attribute is
/// looked up, so a mapping may declare a name twice with different
/// attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Field name, possibly containing placeholder tokens.
    pub name: String,
    /// Declared storage type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    /// Whether every value of this field feeds the all-text aggregate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_text: Option<bool>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type: Some(field_type),
            all_text: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn with_all_text(mut self, all_text: bool) -> Self {
        self.all_text = Some(all_text);
        self
    }

    /// Whether the record carries the given attribute.
    pub fn has_attribute(&self, attribute: FieldAttribute) -> bool {
        match attribute {
            FieldAttribute::Name => true,
            FieldAttribute::Type => self.field_type.is_some(),
            FieldAttribute::AllText => self.all_text.is_some(),
        }
    }
}

/// Placeholder token replaced by the website id in index names.
pub const WEBSITE_ID_TOKEN: &str = "WEBSITE_ID";

/// Search configuration of one entity class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Short alias of the entity, used for scoped events.
    #[serde(default)]
    pub alias: String,
    /// Index name template; defaults to `<alias>_WEBSITE_ID`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl EntityConfig {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            index: None,
            fields: Vec::new(),
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn index_template(&self) -> String {
        match &self.index {
            Some(index) => index.clone(),
            None => format!("{}_{}", self.alias, WEBSITE_ID_TOKEN),
        }
    }

    pub fn with_field(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    /// Stable identity of this configuration, used as part of lookup cache keys.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Errors raised while loading a search mapping.
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Failed to read mapping file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid mapping: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Entity \"{0}\" has an empty alias")]
    EmptyAlias(String),
}

/// Search configuration for all indexed entity classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchMapping {
    entities: BTreeMap<String, EntityConfig>,
}

impl SearchMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity_class: impl Into<String>, config: EntityConfig) -> Self {
        self.entities.insert(entity_class.into(), config);
        self
    }

    /// Parse a mapping from JSON: `{ "<entity class>": { "alias": ..., "fields": [...] } }`.
    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        let mapping: Self = serde_json::from_str(json)?;
        mapping.validate()?;
        Ok(mapping)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), MappingError> {
        for (entity_class, config) in &self.entities {
            if config.alias.trim().is_empty() {
                return Err(MappingError::EmptyAlias(entity_class.clone()));
            }
        }
        Ok(())
    }

    pub fn entity_config(&self, entity_class: &str) -> Option<&EntityConfig> {
        self.entities.get(entity_class)
    }

    pub fn entity_classes(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityConfig)> {
        self.entities.iter().map(|(class, config)| (class.as_str(), config))
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
