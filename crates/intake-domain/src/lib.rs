//! Intake Domain Layer
//!
//! Core model for turning conversation transcripts into feature request records.
//! Infrastructure (HTTP clients, storage) lives in other crates and plugs in
//! through the traits defined here.
//!
//! ## Key Concepts
//!
//! - **Feature request record**: the canonical, all-string record produced by a run
//! - **Stored record**: a record plus the identity and timestamps assigned by a store
//! - **Pipeline run**: the three ordered stages (ingest, analyze, finalize) of one
//!   ingestion attempt, each with its own status
//!
//! ## Architecture
//!
//! - Pure value types and state machines only
//! - No I/O; the `RecordStore` and `AnalysisProvider` seams are implemented elsewhere

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod record;
pub mod stage;
pub mod traits;

// Re-exports for convenience
pub use record::{FeatureRequestRecord, RecordField, RecordId, RecordPatch, StoredRecord};
pub use stage::{PipelineRun, Stage, StageStatus, TransitionError};
