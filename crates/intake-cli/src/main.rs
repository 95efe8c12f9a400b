//! Intake CLI - turn customer-call transcripts into feature requests.

use clap::Parser;
use intake_cli::commands;
use intake_cli::cli::{ConfigAction, ConfigArgs};
use intake_cli::{Cli, Command, Config, Formatter};
use intake_store::JsonFileStore;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file if present, before clap reads env-backed arguments
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "intake=info"
    } else {
        "intake=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> intake_cli::Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    // `config init` and `config path` must work even when the file is broken
    let config = match &cli.command {
        Command::Config(ConfigArgs {
            action: ConfigAction::Init { .. } | ConfigAction::Path,
        }) => Config::load_from(&config_path).unwrap_or_default(),
        _ => Config::load_from(&config_path)?,
    };

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Ingest(args) => {
            let store = open_store(cli.store, &config).await?;
            commands::execute_ingest(args, &config, store, &formatter).await?;
        }
        Command::List => {
            let store = open_store(cli.store, &config).await?;
            commands::execute_list(&store, &formatter).await?;
        }
        Command::Show(args) => {
            let store = open_store(cli.store, &config).await?;
            commands::execute_show(args, &store, &formatter).await?;
        }
        Command::Update(args) => {
            let store = open_store(cli.store, &config).await?;
            commands::execute_update(args, &store, &formatter).await?;
        }
        Command::Delete(args) => {
            let store = open_store(cli.store, &config).await?;
            commands::execute_delete(args, &store, &formatter).await?;
        }
        Command::Config(args) => {
            commands::execute_config(args, &config, &config_path, &formatter)?;
        }
    }

    Ok(())
}

async fn open_store(
    override_path: Option<PathBuf>,
    config: &Config,
) -> intake_cli::Result<JsonFileStore> {
    let path = match override_path {
        Some(path) => path,
        None => config.resolved_store_path()?,
    };
    Ok(JsonFileStore::open(path).await?)
}
