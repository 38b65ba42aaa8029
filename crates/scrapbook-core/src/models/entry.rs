//! Scrapbook entry model

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::non_blank;

/// Server-assigned identifier of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A photo memory: title, date, story text, and an image reference.
///
/// Decoding goes through the backend wire shape, so `image_url` is always
/// normalized (blank or null becomes `None`). Encoding uses the client-side
/// field name `imageUrl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireEntry")]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    /// ISO date (`YYYY-MM-DD`) as the user entered it
    pub date: String,
    pub story: String,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_favorite: bool,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Entry {
    /// Story text split into paragraphs, one per line.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.story.split('\n')
    }

    /// Title truncated to `max_len` characters, or a placeholder when untitled.
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        let title = self.title.trim();
        if title.is_empty() {
            return "(untitled)".to_string();
        }
        title.chars().take(max_len).collect()
    }
}

/// Entry as the backend sends it. Nullable text columns decode as empty.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEntry {
    id: EntryId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    story: Option<String>,
    #[serde(default, alias = "imageUrl")]
    image_url: Option<String>,
    #[serde(default)]
    is_favorite: bool,
    #[serde(default)]
    is_deleted: bool,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<WireEntry> for Entry {
    fn from(wire: WireEntry) -> Self {
        Self {
            id: wire.id,
            title: wire.title.unwrap_or_default(),
            date: wire.date.unwrap_or_default(),
            story: wire.story.unwrap_or_default(),
            image_url: non_blank(wire.image_url),
            is_favorite: wire.is_favorite,
            is_deleted: wire.is_deleted,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

/// User-editable fields sent with create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFields {
    pub title: String,
    pub date: String,
    pub story: String,
}

impl EntryFields {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        story: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            story: story.into(),
        }
    }

    /// Fields of an existing entry, as a starting point for an edit.
    #[must_use]
    pub fn from_entry(entry: &Entry) -> Self {
        Self::new(&entry.title, &entry.date, &entry.story)
    }

    /// Title and date are required; the story may be empty.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".to_string()));
        }
        if self.date.trim().is_empty() {
            return Err(Error::InvalidInput("date is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decodes_wire_entry_and_renames_image_url() {
        let payload = r#"{
            "id": 7,
            "title": "Beach day",
            "date": "2024-06-01",
            "story": "Sand\nSun",
            "image_url": "data:image/png;base64,AAAA",
            "is_favorite": true,
            "created_at": "2024-06-01T10:00:00",
            "updated_at": "2024-06-02T10:00:00"
        }"#;

        let entry: Entry = serde_json::from_str(payload).unwrap();
        assert_eq!(entry.id, EntryId::new(7));
        assert_eq!(entry.image_url.as_deref(), Some("data:image/png;base64,AAAA"));
        assert!(entry.is_favorite);
        assert!(!entry.is_deleted);

        let encoded = serde_json::to_value(&entry).unwrap();
        assert_eq!(encoded["imageUrl"], "data:image/png;base64,AAAA");
        assert!(encoded.get("image_url").is_none());
    }

    #[test]
    fn blank_or_null_image_url_becomes_absent() {
        let blank: Entry =
            serde_json::from_str(r#"{"id": 1, "title": "a", "image_url": "  "}"#).unwrap();
        assert_eq!(blank.image_url, None);

        let null: Entry = serde_json::from_str(r#"{"id": 2, "image_url": null}"#).unwrap();
        assert_eq!(null.image_url, None);
    }

    #[test]
    fn null_text_columns_decode_as_empty() {
        let entry: Entry =
            serde_json::from_str(r#"{"id": 3, "title": null, "date": null, "story": null}"#)
                .unwrap();
        assert_eq!(entry.title, "");
        assert_eq!(entry.date, "");
        assert_eq!(entry.story, "");
        assert_eq!(entry.title_preview(10), "(untitled)");
    }

    #[test]
    fn client_shape_decodes_back() {
        let entry: Entry = serde_json::from_str(r#"{"id": 4, "imageUrl": "a.png"}"#).unwrap();
        assert_eq!(entry.image_url.as_deref(), Some("a.png"));
    }

    #[test]
    fn entry_id_parses_with_whitespace() {
        assert_eq!(" 42 ".parse::<EntryId>().unwrap(), EntryId::new(42));
        assert!("abc".parse::<EntryId>().is_err());
    }

    #[test]
    fn paragraphs_split_on_newlines() {
        let entry: Entry =
            serde_json::from_str(r#"{"id": 5, "story": "First\n\nThird"}"#).unwrap();
        assert_eq!(entry.paragraphs().collect::<Vec<_>>(), vec!["First", "", "Third"]);
    }

    #[test]
    fn fields_require_title_and_date() {
        assert!(EntryFields::new("", "2024-01-01", "x").validate().is_err());
        assert!(EntryFields::new("Title", " ", "x").validate().is_err());
        assert!(EntryFields::new("Title", "2024-01-01", "").validate().is_ok());
    }
}
