//! Ingest command implementation.

use crate::cli::{IngestArgs, FALLBACK_API_KEY_ENV};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use intake_domain::StageStatus;
use intake_extractor::{FnSink, Pipeline, RawDocument};
use intake_llm::{ChatCompletionsProvider, LlmConfig};
use intake_store::JsonFileStore;
use tracing::info;

/// Execute the ingest command.
pub async fn execute_ingest(
    args: IngestArgs,
    config: &Config,
    store: JsonFileStore,
    formatter: &Formatter,
) -> Result<()> {
    let llm_config = llm_config(&args, config)?;
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var(FALLBACK_API_KEY_ENV).ok());

    let provider = ChatCompletionsProvider::new(llm_config, api_key)?;
    if !provider.has_api_key() {
        eprintln!(
            "{}",
            formatter.warning("No API key set; the analysis stage will fail without one")
        );
    }

    let mut document = RawDocument::from_path(&args.path).await?;
    if let Some(media_type) = args.media_type {
        document.media_type = media_type;
    }
    info!("Ingesting {} as {}", args.path.display(), document.media_type);

    let pipeline = Pipeline::new(provider, store, config.extractor.clone());
    let sink = FnSink(|_, stage, status| {
        if status != StageStatus::Pending && formatter.shows_progress() {
            eprintln!("{}", formatter.stage_line(stage, status));
        }
    });

    let success = pipeline.run(document, &sink).await?;

    if success.metadata.discarded_candidates > 0 {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "The transcript mentioned {} more customer(s); only the first was saved",
                success.metadata.discarded_candidates
            ))
        );
    }
    println!("{}", formatter.format_record(&success.record)?);
    if formatter.shows_progress() {
        eprintln!(
            "{}",
            formatter.success(&format!(
                "Feature request saved ({} total, {} ms)",
                success.records.len(),
                success.metadata.processing_time_ms
            ))
        );
    }

    Ok(())
}

/// Config-file settings with command-line overrides applied
fn llm_config(args: &IngestArgs, config: &Config) -> Result<LlmConfig> {
    let mut llm = config.llm.clone();
    if let Some(endpoint) = &args.endpoint {
        llm.endpoint = endpoint.clone();
    }
    if let Some(model) = &args.model {
        llm.model = model.clone();
    }
    llm.validate().map_err(CliError::Config)?;
    Ok(llm)
}
