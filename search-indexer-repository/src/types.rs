//! Result and record types for search index operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::SearchIndexError;
use search_indexer_shared::{EntityId, EntityIndexData};

/// An entity as kept by a search index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredEntity {
    pub entity_id: EntityId,
    pub data: EntityIndexData,
    pub indexed_at: DateTime<Utc>,
}

impl StoredEntity {
    pub fn new(entity_id: EntityId, data: EntityIndexData) -> Self {
        Self {
            entity_id,
            data,
            indexed_at: Utc::now(),
        }
    }
}

/// Result of a batch operation for a single entity.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    pub entity_id: EntityId,
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

impl BatchOperationResult {
    pub fn succeeded(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            success: true,
            error: None,
        }
    }

    pub fn failed(entity_id: EntityId, error: SearchIndexError) -> Self {
        Self {
            entity_id,
            success: false,
            error: Some(error),
        }
    }
}

/// Summary of a batch operation containing aggregate statistics and
/// individual results, so callers can handle partial failures.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Ids of the entities that failed.
    pub fn failed_ids(&self) -> Vec<EntityId> {
        self.results
            .iter()
            .filter(|result| !result.success)
            .map(|result| result.entity_id)
            .collect()
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }
}

impl FromIterator<BatchOperationResult> for BatchOperationSummary {
    fn from_iter<I: IntoIterator<Item = BatchOperationResult>>(iter: I) -> Self {
        let results: Vec<BatchOperationResult> = iter.into_iter().collect();
        let succeeded = results.iter().filter(|result| result.success).count();

        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}
