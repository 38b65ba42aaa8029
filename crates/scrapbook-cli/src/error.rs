use std::io;

use scrapbook_core::EntryId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] scrapbook_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    /// A view-state operation failed; carries the message the view shows.
    #[error("{0}")]
    Request(String),
    #[error("Entry ID must be a number: {0}")]
    InvalidEntryId(String),
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),
    #[error("Deleted entry not found: {0}")]
    DeletedEntryNotFound(EntryId),
    #[error("Nothing to change for entry {0}")]
    NothingToEdit(EntryId),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request cancelled")]
    Cancelled,
}
