//! Soft-deleted entries waiting in the trash

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::entry::{Entry, EntryId, WireEntry};

/// An entry in the trash.
///
/// `entry.id` identifies the trash record itself and is what restore and purge
/// address; `original_id` is the id the entry had before it was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireDeletedEntry")]
pub struct DeletedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    pub original_id: EntryId,
    pub deleted_at: String,
}

impl DeletedEntry {
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.entry.id
    }

    /// Calendar day of `deleted_at`, if the server timestamp parses.
    #[must_use]
    pub fn deleted_on(&self) -> Option<NaiveDate> {
        let raw = self.deleted_at.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.date_naive());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|parsed| parsed.date())
            .ok()
    }
}

#[derive(Debug, Deserialize)]
struct WireDeletedEntry {
    #[serde(flatten)]
    entry: WireEntry,
    #[serde(default)]
    original_id: Option<EntryId>,
    #[serde(default)]
    deleted_at: Option<String>,
}

impl From<WireDeletedEntry> for DeletedEntry {
    fn from(wire: WireDeletedEntry) -> Self {
        let mut entry = Entry::from(wire.entry);
        entry.is_deleted = true;
        let original_id = wire.original_id.unwrap_or(entry.id);
        Self {
            entry,
            original_id,
            deleted_at: wire.deleted_at.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backup_record() {
        let payload = r#"{
            "id": 3,
            "original_id": 11,
            "title": "Snow",
            "date": "2023-12-24",
            "story": "Cold",
            "image_url": "",
            "is_favorite": false,
            "created_at": "2023-12-24T09:00:00",
            "updated_at": "2023-12-24T09:00:00",
            "deleted_at": "2024-01-05T18:30:12.514000"
        }"#;

        let deleted: DeletedEntry = serde_json::from_str(payload).unwrap();
        assert_eq!(deleted.id(), EntryId::new(3));
        assert_eq!(deleted.original_id, EntryId::new(11));
        assert!(deleted.entry.is_deleted);
        assert_eq!(deleted.entry.image_url, None);
        assert_eq!(
            deleted.deleted_on(),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn missing_original_id_falls_back_to_id() {
        let deleted: DeletedEntry =
            serde_json::from_str(r#"{"id": 9, "deleted_at": "2024-01-05T18:30:12Z"}"#).unwrap();
        assert_eq!(deleted.original_id, EntryId::new(9));
        assert_eq!(deleted.deleted_on(), NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn unparseable_deleted_at_has_no_day() {
        let deleted: DeletedEntry =
            serde_json::from_str(r#"{"id": 1, "deleted_at": "yesterday"}"#).unwrap();
        assert_eq!(deleted.deleted_on(), None);
    }

    #[test]
    fn encodes_flat_client_shape() {
        let deleted: DeletedEntry = serde_json::from_str(
            r#"{"id": 2, "original_id": 5, "image_url": "x.jpg", "deleted_at": "2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        let encoded = serde_json::to_value(&deleted).unwrap();
        assert_eq!(encoded["id"], 2);
        assert_eq!(encoded["original_id"], 5);
        assert_eq!(encoded["imageUrl"], "x.jpg");
    }
}
