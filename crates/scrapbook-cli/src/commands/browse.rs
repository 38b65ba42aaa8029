//! Interactive browse session.
//!
//! The session owns the entry list, the trash and the query controller. It
//! reads one command per line and renders the current view after each one.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use scrapbook_core::{
    DeletedCollection, EntryCollection, EntryFields, EntryId, EntryQuery, ImageUpload, LoadPhase,
    Outcome, QueryController, RefreshReason, ScrapbookApi, SortKey,
};

use crate::commands::common::{
    confirm, entry_preview, format_deleted_lines, format_entry_lines, format_story_page,
    normalize_content, normalize_title, parse_entry_id, validate_date, write_lines,
};
use crate::error::CliError;

const HELP: &str = "\
Commands:
  list                   show the entry list
  show <id>              open an entry's story page
  search [text]          filter by text (no text clears it)
  dates <from|-> <to|->  filter by date range (YYYY-MM-DD, - for open)
  clear                  clear search text and dates
  sort date|title        sort; repeat to flip the order
  favorites              toggle favorites only
  fav <id>               toggle an entry's favorite flag
  delete <id>            move an entry to the trash
  add                    create a new entry
  trash                  show deleted entries
  restore <id>           restore a deleted entry
  purge <id>             permanently delete a trash record
  back                   return to the entry list
  refresh                reload the current view
  help                   show this help
  quit                   leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    List,
    Show(EntryId),
    Search(Option<String>),
    Dates(Option<String>, Option<String>),
    Clear,
    Sort(SortKey),
    Favorites,
    Fav(EntryId),
    Delete(EntryId),
    Add,
    Trash,
    Restore(EntryId),
    Purge(EntryId),
    Back,
    Refresh,
    Help,
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let id = || -> Result<EntryId, String> {
            if rest.is_empty() {
                return Err(format!("usage: {word} <id>"));
            }
            parse_entry_id(rest).map_err(|error| error.to_string())
        };

        match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => Ok(Self::List),
            "show" | "open" => id().map(Self::Show),
            "search" => Ok(Self::Search(normalize_content(rest))),
            "dates" => parse_dates(rest),
            "clear" => Ok(Self::Clear),
            "sort" => rest.parse::<SortKey>().map(Self::Sort),
            "favorites" | "favs" => Ok(Self::Favorites),
            "fav" | "favorite" => id().map(Self::Fav),
            "delete" | "rm" => id().map(Self::Delete),
            "add" | "new" => Ok(Self::Add),
            "trash" => Ok(Self::Trash),
            "restore" => id().map(Self::Restore),
            "purge" => id().map(Self::Purge),
            "back" => Ok(Self::Back),
            "refresh" => Ok(Self::Refresh),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "" => Err("type `help` for commands".to_string()),
            other => Err(format!("unknown command '{other}' (type `help`)")),
        }
    }
}

fn parse_dates(rest: &str) -> Result<BrowseCommand, String> {
    let bounds = rest.split_whitespace().collect::<Vec<_>>();
    let [from, to] = bounds.as_slice() else {
        return Err("usage: dates <from|-> <to|->".to_string());
    };
    let bound = |value: &str| -> Result<Option<String>, String> {
        if value == "-" {
            Ok(None)
        } else {
            validate_date(value)
                .map(Some)
                .map_err(|error| error.to_string())
        }
    };
    Ok(BrowseCommand::Dates(bound(from)?, bound(to)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Entries,
    Story(EntryId),
    Trash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct BrowseSession<A> {
    entries: EntryCollection<A>,
    trash: DeletedCollection<A>,
    trash_loaded: bool,
    controller: QueryController,
    view: View,
}

impl<A: ScrapbookApi + Clone> BrowseSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            entries: EntryCollection::new(api.clone()),
            trash: DeletedCollection::new(api),
            trash_loaded: false,
            controller: QueryController::new(),
            view: View::Entries,
        }
    }
}

impl<A: ScrapbookApi> BrowseSession<A> {
    pub const fn view(&self) -> View {
        self.view
    }

    pub const fn entries(&self) -> &EntryCollection<A> {
        &self.entries
    }

    pub const fn trash(&self) -> &DeletedCollection<A> {
        &self.trash
    }

    pub const fn controller(&self) -> &QueryController {
        &self.controller
    }

    /// Close both views; anything still in flight is cancelled.
    pub fn close(&self) {
        self.entries.close();
        self.trash.close();
    }

    /// Load the entry list and render it.
    pub async fn start(&mut self, output: &mut impl Write) -> Result<(), CliError> {
        self.entries.load().await;
        self.render(output)
    }

    pub async fn execute(
        &mut self,
        command: BrowseCommand,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<Flow, CliError> {
        match command {
            BrowseCommand::List | BrowseCommand::Back => {
                self.view = View::Entries;
            }
            BrowseCommand::Show(id) => {
                return self.show(id, output).await.map(|()| Flow::Continue);
            }
            BrowseCommand::Search(text) => {
                let query = self.controller.set_search_text(text);
                self.refresh_entries(&query, RefreshReason::Search).await;
            }
            BrowseCommand::Dates(from, to) => {
                let query = self.controller.set_date_range(from, to);
                self.refresh_entries(&query, RefreshReason::Search).await;
            }
            BrowseCommand::Clear => {
                if !self.controller.has_search_filters() {
                    writeln!(output, "No search filters to clear.")?;
                    return Ok(Flow::Continue);
                }
                let query = self.controller.clear_search();
                self.refresh_entries(&query, RefreshReason::Search).await;
            }
            BrowseCommand::Sort(key) => {
                let query = self.controller.click_sort(key);
                self.refresh_entries(&query, RefreshReason::Sort).await;
            }
            BrowseCommand::Favorites => {
                let query = self.controller.toggle_favorites_only();
                self.refresh_entries(&query, RefreshReason::Favorites).await;
            }
            BrowseCommand::Fav(id) => {
                self.entries.toggle_favorite(id).await;
            }
            BrowseCommand::Delete(id) => self.delete(id, input, output).await?,
            BrowseCommand::Add => self.add(input, output).await?,
            BrowseCommand::Trash => {
                self.view = View::Trash;
                if !self.trash_loaded {
                    self.trash_loaded = self.trash.load().await.is_applied();
                }
            }
            BrowseCommand::Restore(id) => {
                let entries = &mut self.entries;
                self.trash
                    .restore(id, |entry| entries.push_restored(entry))
                    .await;
            }
            BrowseCommand::Purge(id) => self.purge(id, input, output).await?,
            BrowseCommand::Refresh => match self.view {
                View::Trash => {
                    self.trash_loaded = self.trash.load().await.is_applied();
                }
                View::Entries | View::Story(_) => {
                    let query = self.controller.query();
                    self.refresh_entries(&query, RefreshReason::Load).await;
                }
            },
            BrowseCommand::Help => {
                writeln!(output, "{HELP}")?;
                return Ok(Flow::Continue);
            }
            BrowseCommand::Quit => {
                self.close();
                return Ok(Flow::Quit);
            }
        }

        self.render(output)?;
        Ok(Flow::Continue)
    }

    async fn refresh_entries(&mut self, query: &EntryQuery, reason: RefreshReason) {
        self.view = View::Entries;
        self.entries.refresh(query, reason).await;
    }

    async fn show(&mut self, id: EntryId, output: &mut impl Write) -> Result<(), CliError> {
        let page = if let Some(entry) = self.entries.get(id) {
            format_story_page(entry)
        } else {
            match self.entries.api().get_entry(id).await {
                Ok(entry) => format_story_page(&entry),
                Err(error) => {
                    tracing::debug!("Entry {id} unavailable: {error}");
                    writeln!(output, "! {}", CliError::EntryNotFound(id))?;
                    return Ok(());
                }
            }
        };
        self.view = View::Story(id);
        writeln!(output, "{page}")?;
        Ok(())
    }

    async fn delete(
        &mut self,
        id: EntryId,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<(), CliError> {
        let title = self
            .entries
            .get(id)
            .map_or_else(|| format!("entry {id}"), |entry| entry_preview(entry, 40));
        let prompt = format!("Are you sure you want to delete \"{title}\"?");
        if !confirm(&prompt, input, output)? {
            writeln!(output, "Cancelled.")?;
            return Ok(());
        }

        if self.entries.delete(id).await == Outcome::Applied {
            self.trash_loaded = false;
            if self.view == View::Story(id) {
                self.view = View::Entries;
            }
        }
        Ok(())
    }

    async fn purge(
        &mut self,
        id: EntryId,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<(), CliError> {
        let title = self
            .trash
            .get(id)
            .map_or_else(|| format!("record {id}"), |record| entry_preview(&record.entry, 40));
        let prompt = format!(
            "Are you sure you want to permanently delete \"{title}\"? This cannot be undone."
        );
        if !confirm(&prompt, input, output)? {
            writeln!(output, "Cancelled.")?;
            return Ok(());
        }
        self.trash.purge(id).await;
        Ok(())
    }

    async fn add(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<(), CliError> {
        let Some(fields_and_image) = prompt_new_entry(input, output)? else {
            writeln!(output, "Cancelled.")?;
            return Ok(());
        };
        let (fields, image) = match fields_and_image {
            Ok(values) => values,
            Err(error) => {
                writeln!(output, "! {error}")?;
                return Ok(());
            }
        };

        if self.entries.create(&fields, image).await == Outcome::Applied {
            self.controller.reset();
            self.view = View::Entries;
        }
        Ok(())
    }

    fn render(&self, output: &mut impl Write) -> Result<(), CliError> {
        match self.view {
            View::Entries => self.render_entries(output)?,
            View::Story(id) => match self.entries.get(id) {
                Some(entry) => writeln!(output, "{}", format_story_page(entry))?,
                None => self.render_entries(output)?,
            },
            View::Trash => {
                if let Some(error) = self.trash.error() {
                    writeln!(output, "! {error}")?;
                }
                if self.trash.is_empty() {
                    if self.trash.phase() == LoadPhase::Ready {
                        writeln!(output, "Trash is empty.")?;
                    }
                } else {
                    write_lines(output, &format_deleted_lines(self.trash.entries()))?;
                }
            }
        }
        Ok(())
    }

    fn render_entries(&self, output: &mut impl Write) -> Result<(), CliError> {
        if let Some(filters) = describe_filters(&self.controller) {
            writeln!(output, "[{filters}]")?;
        }
        if let Some(error) = self.entries.error() {
            writeln!(output, "! {error}")?;
        }
        if self.entries.is_empty() {
            if self.entries.phase() == LoadPhase::Ready {
                writeln!(output, "No entries found.")?;
            }
        } else {
            write_lines(output, &format_entry_lines(self.entries.entries()))?;
        }
        Ok(())
    }
}

fn describe_filters(controller: &QueryController) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(search) = controller.search() {
        parts.push(format!("search \"{search}\""));
    }
    match controller.date_range() {
        (None, None) => {}
        (from, to) => parts.push(format!(
            "dates {}..{}",
            from.unwrap_or(""),
            to.unwrap_or("")
        )),
    }
    if controller.favorites_only() {
        parts.push("favorites".to_string());
    }
    if let Some((key, order)) = controller.sort() {
        parts.push(format!("sort {key} {order}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn prompt_line(
    label: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Option<String>, CliError> {
    write!(output, "{label}: ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

type NewEntry = Result<(EntryFields, ImageUpload), CliError>;

/// Ask for title, date, image path and story. The story ends at a line
/// holding a single `.` or at end of input. `None` means input ended early.
fn prompt_new_entry(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Option<NewEntry>, CliError> {
    let Some(title) = prompt_line("Title", input, output)? else {
        return Ok(None);
    };
    let Some(date) = prompt_line("Date (YYYY-MM-DD)", input, output)? else {
        return Ok(None);
    };
    let Some(image_path) = prompt_line("Image path", input, output)? else {
        return Ok(None);
    };

    writeln!(output, "Story (end with a line containing only '.'):")?;
    let mut story_lines = Vec::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "." {
            break;
        }
        story_lines.push(line.to_string());
    }

    Ok(Some(build_new_entry(
        &title,
        &date,
        &image_path,
        story_lines.join("\n").trim(),
    )))
}

fn build_new_entry(title: &str, date: &str, image_path: &str, story: &str) -> NewEntry {
    let fields = EntryFields::new(normalize_title(title)?, validate_date(date)?, story);
    let image = ImageUpload::from_path(&PathBuf::from(image_path))?;
    Ok((fields, image))
}

pub async fn run_browse<A: ScrapbookApi + Clone>(
    api: A,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let mut session = BrowseSession::new(api);
    session.start(output).await?;

    loop {
        write!(output, "scrapbook> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        match line.parse::<BrowseCommand>() {
            Ok(command) => {
                if session.execute(command, input, output).await? == Flow::Quit {
                    break;
                }
            }
            Err(message) => writeln!(output, "{message}")?,
        }
    }

    session.close();
    Ok(())
}
