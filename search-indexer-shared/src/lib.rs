//! # Search Indexer Shared
//!
//! Shared types for the website search indexer: the per-entity search
//! mapping, the raw values emitted by field collectors, the indexing
//! context and the structured documents handed to the index writer.

pub mod config;
pub mod context;
pub mod document;
pub mod raw;
pub mod value;

pub use config::{
    EntityConfig, FieldAttribute, FieldConfig, FieldType, MappingError, SearchMapping,
    WEBSITE_ID_TOKEN,
};
pub use context::IndexContext;
pub use document::{EntityIndexData, IndexedDocument};
pub use raw::{EntitiesData, EntityId, RawEntityFields, RawField, RawFieldEntry};
pub use value::{IndexValue, PlaceholderValue, RawValue, Scalar};

/// Name of the default full-text aggregate field.
pub const ALL_TEXT_FIELD: &str = "all_text";

/// Name template of the localized full-text aggregate field.
pub const ALL_TEXT_L10N_FIELD: &str = "all_text_LOCALIZATION_ID";
