//! # Search Indexer Repository
//!
//! This crate provides the index writer abstraction used by the website
//! search indexer. It includes the error types, the provider trait, a
//! validating client and an in-memory provider implementation.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod types;

pub use client::SearchIndexClient;
pub use config::SearchIndexConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use memory::InMemorySearchIndex;
pub use types::{BatchOperationResult, BatchOperationSummary, StoredEntity};
