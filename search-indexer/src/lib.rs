//! # Search Indexer
//!
//! Main library for the website search indexer.
//!
//! This crate provides the configuration, tracing setup and dependency
//! wiring for running an indexing pass over a JSON search mapping and
//! JSON fixtures of collected field values.

pub mod config;
pub mod fixtures;
pub mod telemetry;

pub use config::{Dependencies, LogFormat, Settings};
pub use fixtures::Fixtures;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] search_indexer_pipeline::PipelineError),

    /// Search index error.
    #[error("Search index error: {0}")]
    SearchIndex(#[from] search_indexer_repository::SearchIndexError),

    /// Search mapping could not be loaded.
    #[error("Mapping error: {0}")]
    Mapping(#[from] search_indexer_shared::MappingError),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
