//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use intake_domain::{PipelineRun, RecordField, Stage, StageStatus, StoredRecord};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest cell shown in the records table before truncation
const CELL_WIDTH: usize = 40;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether stage progress should be printed.
    pub fn shows_progress(&self) -> bool {
        !matches!(self.format, OutputFormat::Quiet)
    }

    /// Format a list of records.
    pub fn format_records(&self, records: &[StoredRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Table => Ok(self.format_records_table(records)),
            OutputFormat::Quiet => Ok(format_ids(records)),
        }
    }

    /// Format a single record with every field.
    pub fn format_record(&self, record: &StoredRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
            OutputFormat::Table => Ok(self.format_record_table(record)),
            OutputFormat::Quiet => Ok(record.id.to_string()),
        }
    }

    fn format_records_table(&self, records: &[StoredRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No feature requests found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Customer", "Want", "Feature requests", "Created"]);

        for stored in records {
            let id = stored.id.to_string();
            builder.push_record([
                short_id(&id),
                &truncate(&stored.record.customer),
                &truncate(&stored.record.want),
                &truncate(&stored.record.feature_requests),
                &stored.created_at.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn format_record_table(&self, stored: &StoredRecord) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["ID".to_string(), stored.id.to_string()]);
        for field in RecordField::ALL {
            builder.push_record([field.label(), stored.record.field(field)]);
        }
        builder.push_record(["Created".to_string(), stored.created_at.to_string()]);
        builder.push_record(["Updated".to_string(), stored.updated_at.to_string()]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// One progress line for a stage transition.
    pub fn stage_line(&self, stage: Stage, status: StageStatus) -> String {
        let (marker, color) = match status {
            StageStatus::Pending => ("○", "white"),
            StageStatus::Processing => ("…", "cyan"),
            StageStatus::Completed => ("✓", "green"),
            StageStatus::Error => ("✗", "red"),
        };
        let position = format!("[{}/{}]", stage.index() + 1, Stage::ALL.len());
        let text = match status {
            StageStatus::Processing => format!("{} {} {}", position, marker, stage.description()),
            _ => format!("{} {} {} ({})", position, marker, stage.label(), status),
        };
        self.colorize(&text, color)
    }

    /// Every stage of a finished run, one per line.
    pub fn run_summary(&self, run: &PipelineRun) -> String {
        Stage::ALL
            .iter()
            .map(|stage| self.stage_line(*stage, run.status(*stage)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "white" => text.white().dimmed().to_string(),
            _ => text.to_string(),
        }
    }
}

fn format_ids(records: &[StoredRecord]) -> String {
    records
        .iter()
        .map(|r| r.id.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First eight characters of an ID, for tables
fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// First line of a cell, cut to `CELL_WIDTH` characters
fn truncate(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    let mut cut: String = line.chars().take(CELL_WIDTH).collect();
    if cut.chars().count() < line.chars().count() || text.lines().nth(1).is_some() {
        cut.push('…');
    }
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_domain::FeatureRequestRecord;

    fn create_test_record() -> StoredRecord {
        StoredRecord::new(FeatureRequestRecord {
            customer: "Dana".to_string(),
            when: "busy season".to_string(),
            want: "faster export".to_string(),
            how: "one click".to_string(),
            so_that: "close the books on time".to_string(),
            feature_requests: "CSV export\nscheduled reports".to_string(),
        })
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_records(&[create_test_record()]).unwrap();
        assert!(output.contains("\"soThat\""));
        assert!(output.contains("\"featureRequests\""));
        assert!(output.contains("\"createdAt\""));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let record = create_test_record();
        let output = formatter.format_records(&[record.clone()]).unwrap();
        assert_eq!(output, record.id.to_string());
        assert!(!formatter.shows_progress());
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_records(&[create_test_record()]).unwrap();
        assert!(output.contains("Customer"));
        assert!(output.contains("CSV export…"));
        assert!(!output.contains("scheduled reports"));
    }

    #[test]
    fn test_record_detail_lists_every_field() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_record(&create_test_record()).unwrap();
        for field in RecordField::ALL {
            assert!(output.contains(field.label()), "missing {}", field.label());
        }
        assert!(output.contains("scheduled reports"));
    }

    #[test]
    fn test_empty_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_records(&[]).unwrap();
        assert!(output.contains("No feature requests found"));
    }

    #[test]
    fn test_stage_lines() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(
            formatter.stage_line(Stage::Analyze, StageStatus::Completed),
            "[2/3] ✓ AI analysis (completed)"
        );
        assert_eq!(
            formatter.stage_line(Stage::Finalize, StageStatus::Error),
            "[3/3] ✗ Processing and saving (error)"
        );
    }

    #[test]
    fn test_run_summary() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut run = PipelineRun::new();
        run.start(Stage::Ingest).unwrap();
        run.fail(Stage::Ingest).unwrap();

        let summary = formatter.run_summary(&run);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[1/3] ✗ Upload file (error)");
        assert_eq!(lines[2], "[3/3] ○ Processing and saving (pending)");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        assert_eq!(truncate("first\nsecond"), "first…");
        assert_eq!(truncate(&"x".repeat(50)).chars().count(), CELL_WIDTH + 1);
    }
}
