use std::env;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use scrapbook_core::{ClientConfig, DeletedEntry, Entry, EntryId, Outcome, ScrapbookClient};
use serde::Serialize;

use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub favorite: bool,
    pub image: Option<String>,
    pub story: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedListItem {
    pub id: i64,
    pub original_id: i64,
    pub title: String,
    pub date: String,
    pub deleted_at: String,
}

/// Resolve the backend URL from flag, environment, and profile, in that order.
pub fn resolve_client_config(
    api_url: Option<&str>,
    profile: Option<&str>,
) -> Result<ClientConfig, CliError> {
    let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = profiles.resolve_profile_name(profile);
    let profile_url = profiles
        .profile(&profile_name)
        .and_then(|profile| profile.api_base_url.clone());

    let config = ClientConfig::from_env(api_url.map(ToString::to_string), profile_url)?;
    tracing::debug!(
        "Using API {} (from {}, profile '{}')",
        config.api_base_url,
        config.source,
        profile_name
    );
    Ok(config)
}

pub fn open_client(api_url: Option<&str>, profile: Option<&str>) -> Result<ScrapbookClient, CliError> {
    let config = resolve_client_config(api_url, profile)?;
    Ok(ScrapbookClient::from_config(&config)?)
}

pub fn parse_entry_id(value: &str) -> Result<EntryId, CliError> {
    value
        .parse::<EntryId>()
        .map_err(|_| CliError::InvalidEntryId(value.trim().to_string()))
}

/// Accepts only calendar dates written as `YYYY-MM-DD`.
pub fn validate_date(value: &str) -> Result<String, CliError> {
    let trimmed = value.trim();
    if trimmed.len() != 10 || NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_err() {
        return Err(CliError::InvalidDate(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn validate_optional_date(value: Option<&str>) -> Result<Option<String>, CliError> {
    value
        .and_then(normalize_content)
        .map(|value| validate_date(&value))
        .transpose()
}

pub fn normalize_title(title: &str) -> Result<String, CliError> {
    normalize_content(title).ok_or(CliError::EmptyTitle)
}

/// Maps a non-applied view-state outcome to the view's error message.
pub fn outcome_result(outcome: Outcome, error: Option<&str>) -> Result<(), CliError> {
    match outcome {
        Outcome::Applied | Outcome::Stale => Ok(()),
        Outcome::Cancelled => Err(CliError::Cancelled),
        Outcome::Failed => Err(CliError::Request(
            error.unwrap_or("Request failed").to_string(),
        )),
    }
}

pub fn favorite_marker(entry: &Entry) -> &'static str {
    if entry.is_favorite {
        "★"
    } else {
        " "
    }
}

pub fn format_entry_lines(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{:>5}  {}  {:<10}  {}",
                entry.id,
                favorite_marker(entry),
                entry.date,
                entry_preview(entry, 48)
            )
        })
        .collect()
}

pub fn format_deleted_lines(deleted: &[DeletedEntry]) -> Vec<String> {
    deleted
        .iter()
        .map(|record| {
            let deleted_on = record
                .deleted_on()
                .map_or_else(|| "-".to_string(), |date| date.to_string());
            format!(
                "{:>5}  {:<10}  deleted {:<10}  (was {})  {}",
                record.id(),
                record.entry.date,
                deleted_on,
                record.original_id,
                entry_preview(&record.entry, 40)
            )
        })
        .collect()
}

/// Full story page: title, date, image reference, then the story paragraphs.
pub fn format_story_page(entry: &Entry) -> String {
    let mut lines = vec![
        format!("{} {}", entry.title_preview(usize::MAX), favorite_marker(entry))
            .trim_end()
            .to_string(),
        format!("Date: {}", entry.date),
    ];
    if let Some(image) = &entry.image_url {
        lines.push(format!("Image: {image}"));
    }
    lines.push(String::new());
    lines.extend(entry.paragraphs().map(ToString::to_string));
    lines.join("\n")
}

pub fn entry_to_list_item(entry: &Entry) -> EntryListItem {
    EntryListItem {
        id: entry.id.get(),
        title: entry.title.clone(),
        date: entry.date.clone(),
        favorite: entry.is_favorite,
        image: entry.image_url.clone(),
        story: entry.story.clone(),
    }
}

pub fn deleted_to_list_item(record: &DeletedEntry) -> DeletedListItem {
    DeletedListItem {
        id: record.id().get(),
        original_id: record.original_id.get(),
        title: record.entry.title.clone(),
        date: record.entry.date.clone(),
        deleted_at: record.deleted_at.clone(),
    }
}

pub fn entry_preview(entry: &Entry, max_chars: usize) -> String {
    let collapsed = entry
        .title_preview(usize::MAX)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Story text from the argument, then piped stdin, then `$EDITOR`.
/// An empty story is allowed.
pub fn resolve_story(story: Option<String>) -> Result<String, CliError> {
    if let Some(story) = story {
        return Ok(story.trim().to_string());
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if io::stdin().is_terminal() {
        return Ok(capture_editor_input()?.unwrap_or_default());
    }

    Ok(String::new())
}

/// Ask a yes/no question; anything but `y`/`yes` is a no.
pub fn confirm(
    prompt: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<bool, CliError> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_story_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let story = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&story))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_story_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("scrapbook-story-{}-{now}.md", std::process::id()))
}

pub fn write_lines(output: &mut impl Write, lines: &[String]) -> Result<(), CliError> {
    for line in lines {
        writeln!(output, "{line}")?;
    }
    Ok(())
}
