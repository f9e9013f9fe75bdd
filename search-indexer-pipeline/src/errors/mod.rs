//! Error types for the search indexer pipeline.

use search_indexer_repository::SearchIndexError;
use search_indexer_shared::FieldAttribute;
use thiserror::Error;

/// Errors that can occur in the search indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A field is used that the entity mapping does not describe.
    #[error("Missing option \"{option}\" for \"{field}\" field")]
    ConfigurationError {
        option: FieldAttribute,
        field: String,
    },

    /// No alias is known for the entity class.
    #[error("Entity alias not found for class \"{0}\"")]
    AliasNotFound(String),

    /// The entity class has no search mapping.
    #[error("Entity class \"{0}\" is not mapped for search")]
    EntityNotMapped(String),

    /// A listener rejected the event.
    #[error("Listener error on \"{event}\": {message}")]
    ListenerError { event: String, message: String },

    /// Error from the loader component.
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// Error from the search index.
    #[error("Search index error: {0}")]
    SearchIndex(#[from] SearchIndexError),
}

impl PipelineError {
    /// Create a configuration error.
    pub fn configuration(option: FieldAttribute, field: impl Into<String>) -> Self {
        Self::ConfigurationError {
            option,
            field: field.into(),
        }
    }

    /// Create a listener error.
    pub fn listener(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ListenerError {
            event: event.into(),
            message: message.into(),
        }
    }

    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }
}
