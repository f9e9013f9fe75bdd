//! # Search Indexer Pipeline
//!
//! This crate provides the pipeline components that collect entity data
//! from listeners and index it per website.
//!
//! ## Architecture
//!
//! 1. **Events**: Listeners collect context, restrict entities and emit raw field values
//! 2. **Processor**: Turns raw values into typed documents with all-text aggregates
//! 3. **Loader**: Writes documents into the search index
//! 4. **Orchestrator**: Runs the flow for every website and entity class

pub mod alias;
pub mod errors;
pub mod events;
pub mod html;
pub mod loader;
pub mod orchestrator;
pub mod placeholder;
pub mod processor;

pub use alias::{EntityAliasResolver, MappingAliasResolver};
pub use errors::PipelineError;
pub use events::{EventDispatcher, ListenerRegistry, SearchEvent, SearchEventListener};
pub use html::HtmlTagHelper;
pub use loader::{LoaderConfig, SearchLoader};
pub use orchestrator::{IndexReport, IndexingReport, IndexingRequest, Orchestrator};
pub use placeholder::{
    FieldNameMatcher, PlaceholderNameMatcher, PlaceholderRegistry, PlaceholderResolver,
};
pub use processor::IndexDataProvider;
