use std::io::Write;

use scrapbook_core::ScrapbookApi;

use crate::commands::common::parse_entry_id;
use crate::error::CliError;

pub async fn run_favorite<A: ScrapbookApi>(
    api: &A,
    id: &str,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let id = parse_entry_id(id)?;
    let entry = api.toggle_favorite(id).await?;
    if entry.is_favorite {
        writeln!(output, "★ {} is a favorite", entry.id)?;
    } else {
        writeln!(output, "{} is no longer a favorite", entry.id)?;
    }
    Ok(())
}
