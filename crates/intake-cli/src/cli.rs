//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use intake_domain::RecordPatch;
use std::path::PathBuf;

/// Environment variable holding the generation service credential
pub const API_KEY_ENV: &str = "INTAKE_API_KEY";

/// Legacy credential variable, read when `INTAKE_API_KEY` is unset
pub const FALLBACK_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Environment variable overriding the chat-completions endpoint
pub const ENDPOINT_ENV: &str = "INTAKE_ENDPOINT";

/// Intake - turn customer-call transcripts into feature requests.
#[derive(Debug, Parser)]
#[command(name = "intake")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Records file path (overrides `store_path` from the config)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a transcript and save the resulting feature request
    Ingest(IngestArgs),

    /// List saved feature requests
    List,

    /// Show one feature request
    Show(ShowArgs),

    /// Edit fields of a feature request
    Update(UpdateArgs),

    /// Delete a feature request
    Delete(DeleteArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Transcript file (.txt, .md or .json)
    pub path: PathBuf,

    /// Media type, when the file extension is misleading
    #[arg(short, long)]
    pub media_type: Option<String>,

    /// API key for the chat-completions endpoint
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat-completions endpoint URL
    #[arg(long, env = ENDPOINT_ENV)]
    pub endpoint: Option<String>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Record ID
    pub id: String,
}

/// Arguments for the update command.
#[derive(Debug, Parser)]
pub struct UpdateArgs {
    /// Record ID
    pub id: String,

    /// Customer name or email
    #[arg(long)]
    pub customer: Option<String>,

    /// Context or trigger
    #[arg(long)]
    pub when: Option<String>,

    /// Desired outcome
    #[arg(long)]
    pub want: Option<String>,

    /// Success criteria
    #[arg(long)]
    pub how: Option<String>,

    /// Global goal
    #[arg(long)]
    pub so_that: Option<String>,

    /// Feature requests, one per line
    #[arg(long)]
    pub feature_requests: Option<String>,
}

impl UpdateArgs {
    /// The field replacements requested on the command line
    pub fn patch(&self) -> RecordPatch {
        RecordPatch {
            customer: self.customer.clone(),
            when: self.when.clone(),
            want: self.want.clone(),
            how: self.how.clone(),
            so_that: self.so_that.clone(),
            feature_requests: self.feature_requests.clone(),
        }
    }
}

/// Arguments for the delete command.
#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Record ID
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_domain::RecordField;

    #[test]
    fn test_ingest_command() {
        let cli = Cli::try_parse_from([
            "intake",
            "ingest",
            "call.txt",
            "--api-key",
            "sk-test",
            "--model",
            "deepseek-reasoner",
        ])
        .unwrap();
        match cli.command {
            Command::Ingest(args) => {
                assert_eq!(args.path, PathBuf::from("call.txt"));
                assert_eq!(args.api_key.as_deref(), Some("sk-test"));
                assert_eq!(args.model.as_deref(), Some("deepseek-reasoner"));
            }
            _ => panic!("Expected Ingest command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["intake", "list", "--format", "json", "-v"]).unwrap();
        assert!(matches!(cli.command, Command::List));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.verbose);
    }

    #[test]
    fn test_update_patch() {
        let cli = Cli::try_parse_from([
            "intake",
            "update",
            "0190a5e2-0000-7000-8000-000000000001",
            "--so-that",
            "close the books on time",
        ])
        .unwrap();
        let Command::Update(args) = cli.command else {
            panic!("Expected Update command");
        };
        let patch = args.patch();
        assert_eq!(
            patch.value(RecordField::SoThat).map(String::as_str),
            Some("close the books on time")
        );
        assert!(patch.value(RecordField::Want).is_none());
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["intake"]).is_err());
    }

    #[test]
    fn test_config_init_force() {
        let cli = Cli::try_parse_from(["intake", "config", "init", "--force"]).unwrap();
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force },
            }) => assert!(force),
            _ => panic!("Expected Config Init command"),
        }
    }
}
