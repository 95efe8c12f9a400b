//! Record management commands: list, show, update, delete.

use crate::cli::{DeleteArgs, ShowArgs, UpdateArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use intake_domain::traits::RecordStore;
use intake_domain::RecordId;
use intake_store::{JsonFileStore, StoreError};
use std::io::{self, BufRead, Write};

/// Execute the list command.
pub async fn execute_list(store: &JsonFileStore, formatter: &Formatter) -> Result<()> {
    let records = store.list().await?;
    println!("{}", formatter.format_records(&records)?);
    Ok(())
}

/// Execute the show command.
pub async fn execute_show(args: ShowArgs, store: &JsonFileStore, formatter: &Formatter) -> Result<()> {
    let id = parse_id(&args.id)?;
    let record = store
        .get(id)
        .await?
        .ok_or_else(|| CliError::NotFound(args.id.clone()))?;
    println!("{}", formatter.format_record(&record)?);
    Ok(())
}

/// Execute the update command.
pub async fn execute_update(
    args: UpdateArgs,
    store: &JsonFileStore,
    formatter: &Formatter,
) -> Result<()> {
    let id = parse_id(&args.id)?;
    let patch = args.patch();
    if patch.is_empty() {
        return Err(CliError::InvalidInput(
            "Nothing to update; pass at least one field flag".to_string(),
        ));
    }

    let updated = store.update(id, patch).await.map_err(|e| not_found(e, &args.id))?;
    println!("{}", formatter.format_record(&updated)?);
    Ok(())
}

/// Execute the delete command.
pub async fn execute_delete(
    args: DeleteArgs,
    store: &JsonFileStore,
    formatter: &Formatter,
) -> Result<()> {
    let id = parse_id(&args.id)?;
    let record = store
        .get(id)
        .await?
        .ok_or_else(|| CliError::NotFound(args.id.clone()))?;

    if !args.yes {
        let stdin = io::stdin();
        let prompt = format!(
            "Delete feature request {} ({})? [y/N] ",
            record.id,
            if record.record.customer.is_empty() {
                "unknown customer"
            } else {
                record.record.customer.as_str()
            }
        );
        if !confirm(&prompt, &mut stdin.lock())? {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    store.delete(id).await.map_err(|e| not_found(e, &args.id))?;
    println!("{}", formatter.success(&format!("Deleted {}", record.id)));
    Ok(())
}

/// Parse a record ID argument.
pub fn parse_id(input: &str) -> Result<RecordId> {
    RecordId::from_string(input.trim())
        .map_err(|e| CliError::InvalidInput(format!("Invalid ID '{}': {}", input, e)))
}

/// Ask a yes/no question; anything but `y`/`yes` is a no.
fn confirm(prompt: &str, input: &mut impl BufRead) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut response = String::new();
    input.read_line(&mut response)?;
    let response = response.trim();
    Ok(response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes"))
}

fn not_found(error: StoreError, id: &str) -> CliError {
    match error {
        StoreError::NotFound(_) => CliError::NotFound(id.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_id() {
        let id = RecordId::new();
        assert_eq!(parse_id(&format!(" {} ", id)).unwrap(), id);
        assert!(matches!(parse_id("not-an-id"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_confirm() {
        assert!(confirm("", &mut Cursor::new("y\n")).unwrap());
        assert!(confirm("", &mut Cursor::new("YES\n")).unwrap());
        assert!(!confirm("", &mut Cursor::new("\n")).unwrap());
        assert!(!confirm("", &mut Cursor::new("nope\n")).unwrap());
    }

    #[test]
    fn test_store_not_found_maps_to_cli_not_found() {
        let id = RecordId::new();
        let err = not_found(StoreError::NotFound(id), "abc");
        assert!(matches!(err, CliError::NotFound(s) if s == "abc"));
    }
}
