use std::io::{BufRead, Write};

use scrapbook_core::{DeletedCollection, ScrapbookApi};

use crate::cli::TrashCommands;
use crate::commands::common::{
    confirm, deleted_to_list_item, entry_preview, format_deleted_lines, outcome_result,
    parse_entry_id, write_lines, DeletedListItem,
};
use crate::error::CliError;

pub async fn run_trash<A: ScrapbookApi>(
    api: A,
    command: TrashCommands,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let mut trash = DeletedCollection::new(api);
    let outcome = trash.load().await;
    outcome_result(outcome, trash.error())?;

    match command {
        TrashCommands::List { json } => list_trash(&trash, json, output),
        TrashCommands::Restore { id } => {
            let id = parse_entry_id(&id)?;
            if trash.get(id).is_none() {
                return Err(CliError::DeletedEntryNotFound(id));
            }

            let mut restored = None;
            let outcome = trash.restore(id, |entry| restored = Some(entry)).await;
            outcome_result(outcome, trash.error())?;
            if let Some(entry) = restored {
                writeln!(output, "Restored as {}", entry.id)?;
            }
            Ok(())
        }
        TrashCommands::Purge { id, yes } => {
            let id = parse_entry_id(&id)?;
            let Some(record) = trash.get(id) else {
                return Err(CliError::DeletedEntryNotFound(id));
            };

            if !yes {
                let prompt = format!(
                    "Are you sure you want to permanently delete \"{}\"? This cannot be undone.",
                    entry_preview(&record.entry, 40)
                );
                if !confirm(&prompt, input, output)? {
                    writeln!(output, "Cancelled.")?;
                    return Ok(());
                }
            }

            let outcome = trash.purge(id).await;
            outcome_result(outcome, trash.error())?;
            writeln!(output, "{id}")?;
            Ok(())
        }
    }
}

fn list_trash<A: ScrapbookApi>(
    trash: &DeletedCollection<A>,
    as_json: bool,
    output: &mut impl Write,
) -> Result<(), CliError> {
    if as_json {
        let items = trash
            .entries()
            .iter()
            .map(deleted_to_list_item)
            .collect::<Vec<DeletedListItem>>();
        writeln!(output, "{}", serde_json::to_string_pretty(&items)?)?;
    } else if trash.is_empty() {
        writeln!(output, "Trash is empty.")?;
    } else {
        write_lines(output, &format_deleted_lines(trash.entries()))?;
    }
    Ok(())
}
