//! In-memory backend for tests.
//!
//! Applies the backend's list rules: case-insensitive search over title and
//! story, inclusive date bounds, favorites filter, then sort.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::ScrapbookApi;
use crate::error::{ApiOperation, Error, Result};
use crate::models::{DeletedEntry, Entry, EntryFields, EntryId, ImageUpload, UploadReceipt};
use crate::query::{EntryQuery, SortKey, SortOrder};

pub fn sample_entry(id: i64, title: &str, date: &str) -> Entry {
    Entry {
        id: EntryId::new(id),
        title: title.to_string(),
        date: date.to_string(),
        story: String::new(),
        image_url: Some(format!("{id}.png")),
        is_favorite: false,
        is_deleted: false,
        created_at: None,
        updated_at: None,
    }
}

#[derive(Debug, Default)]
struct FakeState {
    entries: Vec<Entry>,
    deleted: Vec<DeletedEntry>,
    next_id: i64,
    failing: HashSet<ApiOperation>,
    held: bool,
    list_calls: Vec<EntryQuery>,
}

impl FakeState {
    fn allocate_id(&mut self) -> EntryId {
        let highest = self
            .entries
            .iter()
            .map(|entry| entry.id.get())
            .chain(self.deleted.iter().map(|deleted| deleted.id().get()))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest) + 1;
        EntryId::new(self.next_id)
    }
}

/// Cloneable handle; clones share one backend.
#[derive(Debug, Clone, Default)]
pub struct FakeScrapbook {
    state: Arc<Mutex<FakeState>>,
}

impl FakeScrapbook {
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        let fake = Self::default();
        fake.lock().entries = entries;
        fake
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fail(&self, operation: ApiOperation) {
        self.lock().failing.insert(operation);
    }

    pub fn recover(&self, operation: ApiOperation) {
        self.lock().failing.remove(&operation);
    }

    /// Every later request stays pending forever.
    pub fn hold_requests(&self) {
        self.lock().held = true;
    }

    pub fn list_calls(&self) -> Vec<EntryQuery> {
        self.lock().list_calls.clone()
    }

    pub fn stored(&self, id: EntryId) -> Option<Entry> {
        self.lock().entries.iter().find(|entry| entry.id == id).cloned()
    }

    /// Ids of stored entries, in storage order.
    pub fn entry_ids(&self) -> Vec<i64> {
        self.lock().entries.iter().map(|entry| entry.id.get()).collect()
    }

    /// Trash record ids, in deletion order.
    pub fn deleted_ids(&self) -> Vec<i64> {
        self.lock()
            .deleted
            .iter()
            .map(|deleted| deleted.id().get())
            .collect()
    }

    async fn enter(&self, operation: ApiOperation) -> Result<()> {
        let (held, failing) = {
            let state = self.lock();
            (state.held, state.failing.contains(&operation))
        };
        if held {
            std::future::pending::<()>().await;
        }
        if failing {
            return Err(Error::request_failed(
                operation,
                Some(500),
                "Internal Server Error",
            ));
        }
        Ok(())
    }

    fn not_found(operation: ApiOperation) -> Error {
        Error::request_failed(operation, Some(404), "not found")
    }
}

fn matches(entry: &Entry, query: &EntryQuery) -> bool {
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        if !entry.title.to_lowercase().contains(&needle)
            && !entry.story.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if query
        .start_date
        .as_deref()
        .is_some_and(|start| entry.date.as_str() < start)
    {
        return false;
    }
    if query
        .end_date
        .as_deref()
        .is_some_and(|end| entry.date.as_str() > end)
    {
        return false;
    }
    !query.favorites_only || entry.is_favorite
}

impl ScrapbookApi for FakeScrapbook {
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>> {
        self.lock().list_calls.push(query.clone());
        self.enter(ApiOperation::ListEntries).await?;

        let mut entries: Vec<Entry> = self
            .lock()
            .entries
            .iter()
            .filter(|entry| matches(entry, query))
            .cloned()
            .collect();
        if let Some(key) = query.sort_by {
            entries.sort_by(|left, right| match key {
                SortKey::Date => left.date.cmp(&right.date),
                SortKey::Title => left.title.cmp(&right.title),
            });
            if query.sort_order == Some(SortOrder::Desc) {
                entries.reverse();
            }
        }
        Ok(entries)
    }

    async fn get_entry(&self, id: EntryId) -> Result<Entry> {
        self.enter(ApiOperation::GetEntry).await?;
        self.stored(id)
            .ok_or_else(|| Self::not_found(ApiOperation::GetEntry))
    }

    async fn create_entry(&self, fields: &EntryFields, image: ImageUpload) -> Result<Entry> {
        self.enter(ApiOperation::CreateEntry).await?;
        let mut state = self.lock();
        let id = state.allocate_id();
        let entry = Entry {
            id,
            title: fields.title.clone(),
            date: fields.date.clone(),
            story: fields.story.clone(),
            image_url: Some(image.file_name),
            is_favorite: false,
            is_deleted: false,
            created_at: None,
            updated_at: None,
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn update_entry(
        &self,
        id: EntryId,
        fields: &EntryFields,
        image: Option<ImageUpload>,
    ) -> Result<Entry> {
        self.enter(ApiOperation::UpdateEntry).await?;
        let mut state = self.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| Self::not_found(ApiOperation::UpdateEntry))?;
        entry.title.clone_from(&fields.title);
        entry.date.clone_from(&fields.date);
        entry.story.clone_from(&fields.story);
        if let Some(image) = image {
            entry.image_url = Some(image.file_name);
        }
        entry.updated_at = Some("2024-09-01T00:00:00".to_string());
        Ok(entry.clone())
    }

    async fn delete_entry(&self, id: EntryId) -> Result<()> {
        self.enter(ApiOperation::DeleteEntry).await?;
        let mut state = self.lock();
        let index = state
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| Self::not_found(ApiOperation::DeleteEntry))?;
        let mut entry = state.entries.remove(index);
        let backup_id = state.allocate_id();
        entry.id = backup_id;
        entry.is_deleted = true;
        state.deleted.push(DeletedEntry {
            entry,
            original_id: id,
            deleted_at: "2024-09-01T12:00:00".to_string(),
        });
        Ok(())
    }

    async fn list_deleted(&self) -> Result<Vec<DeletedEntry>> {
        self.enter(ApiOperation::ListDeleted).await?;
        Ok(self.lock().deleted.clone())
    }

    async fn restore_entry(&self, id: EntryId) -> Result<Entry> {
        self.enter(ApiOperation::RestoreEntry).await?;
        let mut state = self.lock();
        let index = state
            .deleted
            .iter()
            .position(|deleted| deleted.id() == id)
            .ok_or_else(|| Self::not_found(ApiOperation::RestoreEntry))?;
        let deleted = state.deleted.remove(index);
        let mut entry = deleted.entry;
        entry.id = state.allocate_id();
        entry.is_deleted = false;
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn purge_entry(&self, id: EntryId) -> Result<()> {
        self.enter(ApiOperation::PurgeEntry).await?;
        let mut state = self.lock();
        let before = state.deleted.len();
        state.deleted.retain(|deleted| deleted.id() != id);
        if state.deleted.len() == before {
            return Err(Self::not_found(ApiOperation::PurgeEntry));
        }
        Ok(())
    }

    async fn toggle_favorite(&self, id: EntryId) -> Result<Entry> {
        self.enter(ApiOperation::ToggleFavorite).await?;
        let mut state = self.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| Self::not_found(ApiOperation::ToggleFavorite))?;
        entry.is_favorite = !entry.is_favorite;
        entry.updated_at = Some("2024-09-01T00:00:00".to_string());
        Ok(entry.clone())
    }

    async fn upload_image(&self, image: ImageUpload) -> Result<UploadReceipt> {
        self.enter(ApiOperation::UploadImage).await?;
        Ok(UploadReceipt {
            filename: image.file_name,
        })
    }
}
