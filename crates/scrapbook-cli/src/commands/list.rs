use std::io::Write;

use scrapbook_core::{
    EntryCollection, QueryController, RefreshReason, ScrapbookApi, SortKey, SortOrder,
};

use crate::commands::common::{
    entry_to_list_item, format_entry_lines, outcome_result, validate_optional_date, write_lines,
    EntryListItem,
};
use crate::error::CliError;

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<SortKey>,
    pub order: Option<SortOrder>,
    pub favorites: bool,
}

impl ListOptions {
    fn refresh_reason(&self) -> RefreshReason {
        if self.search.is_some() || self.from.is_some() || self.to.is_some() {
            RefreshReason::Search
        } else if self.favorites {
            RefreshReason::Favorites
        } else if self.sort.is_some() {
            RefreshReason::Sort
        } else {
            RefreshReason::Load
        }
    }
}

pub async fn run_list<A: ScrapbookApi>(
    api: A,
    options: ListOptions,
    as_json: bool,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let start_date = validate_optional_date(options.from.as_deref())?;
    let end_date = validate_optional_date(options.to.as_deref())?;
    let reason = options.refresh_reason();

    let mut controller = QueryController::new();
    controller.apply_search(options.search, start_date, end_date);
    if let Some(key) = options.sort {
        controller.set_sort(key, options.order.unwrap_or(SortOrder::Asc));
    }
    if options.favorites {
        controller.toggle_favorites_only();
    }

    let mut entries = EntryCollection::new(api);
    let outcome = entries.refresh(&controller.query(), reason).await;
    outcome_result(outcome, entries.error())?;

    if as_json {
        let json_items = entries
            .entries()
            .iter()
            .map(entry_to_list_item)
            .collect::<Vec<EntryListItem>>();
        writeln!(output, "{}", serde_json::to_string_pretty(&json_items)?)?;
    } else if entries.is_empty() {
        writeln!(output, "No entries found.")?;
    } else {
        write_lines(output, &format_entry_lines(entries.entries()))?;
    }

    Ok(())
}
