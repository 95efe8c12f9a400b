//! Pipeline orchestrator: ingest, analyze, finalize

use crate::config::ExtractorConfig;
use crate::document::{PlainTextExtractor, RawDocument, TextExtractor};
use crate::error::ExtractorError;
use crate::normalize::normalize;
use crate::parser::parse_reply;
use crate::progress::{ProgressSink, StepTracker};
use crate::prompt::{PromptBuilder, TEMPLATE_VERSION};
use intake_domain::traits::{AnalysisProvider, RecordStore};
use intake_domain::{PipelineRun, Stage, StoredRecord};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result of one pipeline invocation
pub type PipelineOutcome = Result<PipelineSuccess, PipelineFailure>;

/// A run that reached `finalize: completed`
#[derive(Debug, Clone)]
pub struct PipelineSuccess {
    /// The record as created by the store
    pub record: StoredRecord,

    /// The store's records after the post-create refresh
    pub records: Vec<StoredRecord>,

    /// Terminal run state (all stages completed)
    pub run: PipelineRun,

    /// Metadata about the run
    pub metadata: RunMetadata,
}

/// A run that stopped at a failed stage
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineFailure {
    /// Terminal run state
    pub run: PipelineRun,

    /// The stage marked as error
    pub stage: Option<Stage>,

    /// What went wrong
    #[source]
    pub error: ExtractorError,

    /// The single message to show the user
    pub message: String,
}

/// Metadata about a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    /// Name of the ingested document
    pub document_name: String,

    /// Model that produced the analysis
    pub model_name: String,

    /// Version of the prompt template used
    pub template_version: &'static str,

    /// Entities in the reply beyond the first, which were dropped
    pub discarded_candidates: usize,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u64,
}

/// What `execute` hands back on success
struct Finalized {
    record: StoredRecord,
    records: Vec<StoredRecord>,
    discarded_candidates: usize,
}

/// Orchestrates one transcript through text extraction, analysis, parsing,
/// normalization and persistence
///
/// Every call to [`Pipeline::run`] starts a fresh [`PipelineRun`]; a failed run
/// is never resumed.
///
/// # Examples
///
/// ```
/// use intake_extractor::{Pipeline, ExtractorConfig, RawDocument, NoopSink};
/// use intake_llm::MockProvider;
/// use intake_store::MemoryStore;
///
/// # #[tokio::main]
/// # async fn main() {
/// let llm = MockProvider::new(r#"Sure: [{"Want (desired outcome)": "CSV export"}]"#);
/// let pipeline = Pipeline::new(llm, MemoryStore::new(), ExtractorConfig::default());
///
/// let document = RawDocument::from_text("call.txt", "Dana: I need CSV export");
/// let success = pipeline.run(document, &NoopSink).await.unwrap();
/// assert_eq!(success.record.record.want, "CSV export");
/// # }
/// ```
pub struct Pipeline<L, S>
where
    L: AnalysisProvider,
    S: RecordStore,
{
    text_extractor: Box<dyn TextExtractor>,
    provider: L,
    store: S,
    config: ExtractorConfig,
}

impl<L, S> Pipeline<L, S>
where
    L: AnalysisProvider,
    S: RecordStore,
    ExtractorError: From<L::Error>,
{
    /// Create a pipeline using the plain-text extractor
    pub fn new(provider: L, store: S, config: ExtractorConfig) -> Self {
        Self {
            text_extractor: Box::new(PlainTextExtractor::new(&config)),
            provider,
            store,
            config,
        }
    }

    /// Replace the text extractor
    pub fn with_text_extractor(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.text_extractor = Box::new(extractor);
        self
    }

    /// The record store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The analysis provider
    pub fn provider(&self) -> &L {
        &self.provider
    }

    /// The pipeline configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run the whole pipeline for one document
    ///
    /// Stage transitions are reported to `sink` as they happen. Errors never
    /// escape as panics or raw errors: a failure marks the running stage as
    /// `error` and comes back as [`PipelineFailure`].
    pub async fn run(&self, document: RawDocument, sink: &dyn ProgressSink) -> PipelineOutcome {
        let start = Instant::now();
        let mut tracker = StepTracker::new(sink);

        info!(
            "Starting ingestion of '{}' ({} bytes, {})",
            document.name,
            document.bytes.len(),
            document.media_type
        );

        match self.execute(&document, &mut tracker).await {
            Ok(finalized) => {
                let metadata = RunMetadata {
                    document_name: document.name,
                    model_name: self.provider.model_name().to_string(),
                    template_version: TEMPLATE_VERSION,
                    discarded_candidates: finalized.discarded_candidates,
                    processing_time_ms: start.elapsed().as_millis() as u64,
                };
                info!(
                    "Ingestion complete: record {} created in {} ms",
                    finalized.record.id, metadata.processing_time_ms
                );
                Ok(PipelineSuccess {
                    record: finalized.record,
                    records: finalized.records,
                    run: tracker.run(),
                    metadata,
                })
            }
            Err(error) => {
                let stage = tracker.fail_current();
                let message = error.user_message();
                match stage {
                    Some(stage) => warn!("Stage {} failed: {}", stage, error),
                    None => warn!("Run aborted outside any stage: {}", error),
                }
                Err(PipelineFailure {
                    run: tracker.run(),
                    stage,
                    error,
                    message,
                })
            }
        }
    }

    async fn execute(
        &self,
        document: &RawDocument,
        tracker: &mut StepTracker<'_>,
    ) -> Result<Finalized, ExtractorError> {
        tracker.begin(Stage::Ingest)?;
        let text = self.text_extractor.extract(document)?;
        debug!("Extracted {} chars of text", text.len());
        tracker.complete(Stage::Ingest)?;

        tracker.begin(Stage::Analyze)?;
        let prompt = PromptBuilder::new(text)
            .with_team_speakers(self.config.team_speakers.clone())
            .build()
            .render();
        debug!("Prompt length: {} chars", prompt.len());
        let reply = self.provider.complete(&prompt).await?;
        debug!("Reply length: {} chars", reply.len());
        tracker.complete(Stage::Analyze)?;

        tracker.begin(Stage::Finalize)?;
        let mut candidates = parse_reply(&reply)?;
        let discarded_candidates = candidates.len() - 1;
        if discarded_candidates > 0 {
            warn!(
                "Reply contained {} entities; keeping the first and discarding {}",
                candidates.len(),
                discarded_candidates
            );
        }
        let record = normalize(&candidates.swap_remove(0));

        let stored = self
            .store
            .create(record)
            .await
            .map_err(|e| ExtractorError::Persistence(e.to_string()))?;
        let records = self
            .store
            .list()
            .await
            .map_err(|e| ExtractorError::Persistence(e.to_string()))?;
        tracker.complete(Stage::Finalize)?;

        Ok(Finalized {
            record: stored,
            records,
            discarded_candidates,
        })
    }
}
