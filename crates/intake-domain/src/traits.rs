//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the ingestion pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{FeatureRequestRecord, RecordId, RecordPatch, StoredRecord};
use async_trait::async_trait;

/// Trait for storing and retrieving feature request records
///
/// Implemented by the infrastructure layer (intake-store)
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist a new record, assigning its identity
    async fn create(&self, record: FeatureRequestRecord) -> Result<StoredRecord, Self::Error>;

    /// All records, oldest first
    async fn list(&self) -> Result<Vec<StoredRecord>, Self::Error>;

    /// Get a record by ID
    async fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, Self::Error>;

    /// Apply a patch to an existing record
    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<StoredRecord, Self::Error>;

    /// Remove a record
    async fn delete(&self, id: RecordId) -> Result<(), Self::Error>;
}

/// Trait for text-generation services
///
/// Implemented by the infrastructure layer (intake-llm)
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Error type for generation calls
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send one prompt and return the raw reply text
    async fn complete(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Model identifier used for the calls (for logging)
    fn model_name(&self) -> &str;
}
