//! Data models for The Scrapbook

mod deleted_entry;
mod entry;
mod upload;

pub use deleted_entry::DeletedEntry;
pub use entry::{Entry, EntryFields, EntryId};
pub use upload::{ImageUpload, UploadReceipt};

/// Trimmed text, or `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
