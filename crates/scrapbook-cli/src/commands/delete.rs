use std::io::{BufRead, Write};

use scrapbook_core::ScrapbookApi;

use crate::commands::common::{confirm, entry_preview, parse_entry_id};
use crate::error::CliError;

/// Soft delete: the entry moves to the trash.
pub async fn run_delete<A: ScrapbookApi>(
    api: &A,
    id: &str,
    skip_confirmation: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let id = parse_entry_id(id)?;
    let entry = api.get_entry(id).await?;

    if !skip_confirmation {
        let prompt = format!(
            "Are you sure you want to delete \"{}\"?",
            entry_preview(&entry, 40)
        );
        if !confirm(&prompt, input, output)? {
            writeln!(output, "Cancelled.")?;
            return Ok(());
        }
    }

    api.delete_entry(id).await?;
    writeln!(output, "{id}")?;
    Ok(())
}
