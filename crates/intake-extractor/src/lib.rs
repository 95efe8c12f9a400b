//! Intake Extractor
//!
//! Turns a customer-call transcript into a stored feature-request record.
//!
//! # Overview
//!
//! A run moves through three stages, each reported to a [`ProgressSink`]:
//!
//! ```text
//! ingest:   RawDocument → TextExtractor → text
//! analyze:  text → PromptBuilder → AnalysisProvider → reply
//! finalize: reply → parse_reply → normalize → RecordStore
//! ```
//!
//! Any failure marks the running stage as `error`, leaves later stages
//! `pending`, and yields a single user-facing message. Nothing is persisted
//! unless the whole run succeeds.
//!
//! # Example Usage
//!
//! ```no_run
//! use intake_extractor::{ExtractorConfig, Pipeline, RawDocument, RecordingSink};
//! use intake_llm::{ChatCompletionsProvider, LlmConfig};
//! use intake_store::JsonFileStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = ChatCompletionsProvider::new(LlmConfig::default(), std::env::var("INTAKE_API_KEY").ok())?;
//! let store = JsonFileStore::open("records.json").await?;
//! let pipeline = Pipeline::new(llm, store, ExtractorConfig::default());
//!
//! let document = RawDocument::from_path("call-2024-03-12.txt").await?;
//! let sink = RecordingSink::new();
//!
//! match pipeline.run(document, &sink).await {
//!     Ok(success) => println!("Saved {}", success.record.id),
//!     Err(failure) => eprintln!("{}", failure.message),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod document;
mod error;
mod normalize;
mod parser;
mod pipeline;
mod progress;
mod prompt;


pub use config::{ExtractorConfig, DEFAULT_MEDIA_TYPES};
pub use document::{media_type_for_path, PlainTextExtractor, RawDocument, TextExtractor};
pub use error::{ExtractorError, GENERIC_FAILURE_MESSAGE};
pub use normalize::{
    field_aliases, join_array, normalize, normalize_value, probe_object, scalar_text,
    verbatim_string, CoercionRule, COERCION_RULES, PROBE_KEYS,
};
pub use parser::{parse_reply, ParsedRecordCandidate, EMPTY_RESULT, NO_STRUCTURED_DATA};
pub use pipeline::{Pipeline, PipelineFailure, PipelineOutcome, PipelineSuccess, RunMetadata};
pub use progress::{FnSink, NoopSink, ProgressSink, RecordingSink};
pub use prompt::{AnalysisPrompt, PromptBuilder, TEMPLATE_VERSION};
