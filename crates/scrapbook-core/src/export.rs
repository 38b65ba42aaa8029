//! Scrapbook export in JSON and Markdown.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::{DeletedEntry, Entry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Flat record written for each exported entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub story: String,
    pub image: Option<String>,
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

#[must_use]
pub fn entry_to_export_item(entry: &Entry) -> ExportEntry {
    ExportEntry {
        id: entry.id.get(),
        title: entry.title.clone(),
        date: entry.date.clone(),
        story: entry.story.clone(),
        image: entry.image_url.clone(),
        favorite: entry.is_favorite,
        original_id: None,
        deleted_at: None,
    }
}

#[must_use]
pub fn deleted_to_export_item(deleted: &DeletedEntry) -> ExportEntry {
    ExportEntry {
        original_id: Some(deleted.original_id.get()),
        deleted_at: Some(deleted.deleted_at.clone()).filter(|value| !value.is_empty()),
        ..entry_to_export_item(&deleted.entry)
    }
}

/// Render entries as pretty-printed JSON.
pub fn render_json_export(entries: &[Entry]) -> serde_json::Result<String> {
    let items = entries
        .iter()
        .map(entry_to_export_item)
        .collect::<Vec<ExportEntry>>();
    serde_json::to_string_pretty(&items)
}

/// Render entries as Markdown, one section per entry.
#[must_use]
pub fn render_markdown_export(entries: &[Entry]) -> String {
    render_markdown_items(entries.iter().map(entry_to_export_item))
}

pub fn render_entries_export(entries: &[Entry], format: ExportFormat) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(entries),
        ExportFormat::Markdown => Ok(render_markdown_export(entries)),
    }
}

/// Same as [`render_entries_export`] for the trash, with deletion metadata.
pub fn render_deleted_export(
    deleted: &[DeletedEntry],
    format: ExportFormat,
) -> serde_json::Result<String> {
    let items = deleted.iter().map(deleted_to_export_item);
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(&items.collect::<Vec<_>>()),
        ExportFormat::Markdown => Ok(render_markdown_items(items)),
    }
}

fn render_markdown_items(items: impl Iterator<Item = ExportEntry>) -> String {
    let mut output = String::new();

    for (index, item) in items.enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let title = if item.title.trim().is_empty() {
            "(untitled)"
        } else {
            item.title.trim()
        };
        let _ = writeln!(output, "## {title}");
        let _ = writeln!(output);
        let _ = writeln!(output, "- Date: {}", item.date);
        let _ = writeln!(
            output,
            "- Favorite: {}",
            if item.favorite { "yes" } else { "no" }
        );
        if let Some(image) = &item.image {
            let _ = writeln!(output, "- Image: {image}");
        }
        if let Some(deleted_at) = &item.deleted_at {
            let _ = writeln!(output, "- Deleted: {deleted_at}");
        }
        for paragraph in item.story.split('\n').filter(|line| !line.trim().is_empty()) {
            let _ = writeln!(output);
            let _ = writeln!(output, "{paragraph}");
        }
    }

    output
}

/// Default export file name for a timestamp.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("scrapbook-export-{timestamp_ms}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::EntryId;

    fn entry() -> Entry {
        Entry {
            id: EntryId::new(4),
            title: "Harbor".to_string(),
            date: "2024-05-18".to_string(),
            story: "Boats everywhere.\n\nGulls too.".to_string(),
            image_url: Some("harbor.jpg".to_string()),
            is_favorite: true,
            is_deleted: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn markdown_has_heading_metadata_and_paragraphs() {
        let rendered = render_markdown_export(&[entry()]);
        assert_eq!(
            rendered,
            "## Harbor\n\n- Date: 2024-05-18\n- Favorite: yes\n- Image: harbor.jpg\n\nBoats everywhere.\n\nGulls too.\n"
        );
    }

    #[test]
    fn json_export_uses_flat_records() {
        let rendered = render_entries_export(&[entry()], ExportFormat::Json).unwrap();
        let parsed: Vec<ExportEntry> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, vec![entry_to_export_item(&entry())]);
        assert!(!rendered.contains("deleted_at"));
    }

    #[test]
    fn deleted_export_carries_trash_metadata() {
        let deleted = DeletedEntry {
            entry: Entry {
                id: EntryId::new(9),
                is_deleted: true,
                ..entry()
            },
            original_id: EntryId::new(4),
            deleted_at: "2024-06-01T08:00:00".to_string(),
        };

        let markdown = render_deleted_export(&[deleted.clone()], ExportFormat::Markdown).unwrap();
        assert!(markdown.contains("- Deleted: 2024-06-01T08:00:00"));

        let json = render_deleted_export(&[deleted], ExportFormat::Json).unwrap();
        assert!(json.contains("\"original_id\": 4"));
    }

    #[test]
    fn suggested_export_file_name_uses_format_extension() {
        assert_eq!(
            suggested_export_file_name(ExportFormat::Json, 123),
            "scrapbook-export-123.json"
        );
        assert_eq!(
            suggested_export_file_name(ExportFormat::Markdown, 456),
            "scrapbook-export-456.md"
        );
    }
}
