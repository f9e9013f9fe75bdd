//! Processor module for the search indexer pipeline.
//!
//! Turns the raw field values collected by listeners into typed,
//! placeholder-expanded documents with all-text aggregates.

mod all_text;
mod builder;
mod field_config;
mod index_data_provider;

pub use all_text::{merge_localized_all_text, squash_all_text_fields};
pub use builder::{merge_values, EntityIndexBuilder};
pub use field_config::{ConfigLookup, FieldConfigCache};
pub use index_data_provider::IndexDataProvider;
