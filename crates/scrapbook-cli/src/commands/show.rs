use std::io::Write;

use scrapbook_core::ScrapbookApi;

use crate::commands::common::{entry_to_list_item, format_story_page, parse_entry_id};
use crate::error::CliError;

pub async fn run_show<A: ScrapbookApi>(
    api: &A,
    id: &str,
    as_json: bool,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let id = parse_entry_id(id)?;
    let entry = api.get_entry(id).await?;

    if as_json {
        writeln!(
            output,
            "{}",
            serde_json::to_string_pretty(&entry_to_list_item(&entry))?
        )?;
    } else {
        writeln!(output, "{}", format_story_page(&entry))?;
    }
    Ok(())
}
