//! Backend REST API access.
//!
//! [`ScrapbookApi`] is the seam the view-state layer talks to; the HTTP
//! implementation is [`ScrapbookClient`].

mod client;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use client::ScrapbookClient;

use crate::models::{DeletedEntry, Entry, EntryFields, EntryId, ImageUpload, UploadReceipt};
use crate::query::EntryQuery;
use crate::Result;

/// One async call per backend capability.
///
/// Implementations fail with [`crate::Error::RequestFailed`] on any
/// unsuccessful request and return entries with `image_url` normalized.
#[allow(async_fn_in_trait)]
pub trait ScrapbookApi {
    /// List non-deleted entries matching `query`, in server order
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>>;

    async fn get_entry(&self, id: EntryId) -> Result<Entry>;

    /// Create an entry from form fields and its image
    async fn create_entry(&self, fields: &EntryFields, image: ImageUpload) -> Result<Entry>;

    /// Replace an entry's fields, optionally swapping its image
    async fn update_entry(
        &self,
        id: EntryId,
        fields: &EntryFields,
        image: Option<ImageUpload>,
    ) -> Result<Entry>;

    /// Soft delete: the entry moves to the trash
    async fn delete_entry(&self, id: EntryId) -> Result<()>;

    async fn list_deleted(&self) -> Result<Vec<DeletedEntry>>;

    /// Restore a trash record; returns the entry as the server recreated it
    async fn restore_entry(&self, id: EntryId) -> Result<Entry>;

    /// Permanently delete a trash record
    async fn purge_entry(&self, id: EntryId) -> Result<()>;

    /// Flip the favorite flag server-side; returns the updated entry
    async fn toggle_favorite(&self, id: EntryId) -> Result<Entry>;

    /// Upload an image on its own; returns the stored file name
    async fn upload_image(&self, image: ImageUpload) -> Result<UploadReceipt>;
}
