//! HTTP implementation of the Scrapbook backend API.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::ScrapbookApi;
use crate::config::{normalize_base_url, ClientConfig};
use crate::error::{ApiOperation, Error, Result};
use crate::models::{DeletedEntry, Entry, EntryFields, EntryId, ImageUpload, UploadReceipt};
use crate::query::EntryQuery;

/// Collection route as the backend mounts it; `/entries` answers 307.
const ENTRIES_PATH: &str = "/entries/";
const ERROR_EXCERPT_CHARS: usize = 180;

/// REST client for the Scrapbook backend.
#[derive(Debug, Clone)]
pub struct ScrapbookClient {
    base_url: String,
    client: Client,
}

impl ScrapbookClient {
    /// Builds a client for an explicit API base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.as_ref())?;
        let client = Client::builder().build().map_err(|error| {
            Error::InvalidConfiguration(format!("Failed to construct HTTP client: {error}"))
        })?;
        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.api_base_url)
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn list_entries_request(&self, query: &EntryQuery) -> RequestBuilder {
        self.client
            .get(self.url(ENTRIES_PATH))
            .query(&query.to_query_pairs())
    }

    fn create_entry_request(
        &self,
        fields: &EntryFields,
        image: ImageUpload,
    ) -> Result<RequestBuilder> {
        let form = entry_form(fields, Some(image), ApiOperation::CreateEntry)?;
        Ok(self.client.post(self.url(ENTRIES_PATH)).multipart(form))
    }

    fn update_entry_request(
        &self,
        id: EntryId,
        fields: &EntryFields,
        image: Option<ImageUpload>,
    ) -> Result<RequestBuilder> {
        let form = entry_form(fields, image, ApiOperation::UpdateEntry)?;
        Ok(self
            .client
            .put(self.url(&format!("/entries/{id}")))
            .multipart(form))
    }

    async fn send(&self, operation: ApiOperation, request: RequestBuilder) -> Result<Response> {
        let request = request
            .build()
            .map_err(|error| Error::request_failed(operation, None, error.to_string()))?;
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            "Sending {:?} request",
            operation
        );

        let response = self.client.execute(request).await.map_err(|error| {
            tracing::warn!("{}: {}", operation.failure_message(), error);
            Error::request_failed(operation, None, error.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.trim().is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                body_excerpt(&body)
            };
            tracing::warn!(
                status = status.as_u16(),
                "{}: {}",
                operation.failure_message(),
                detail
            );
            return Err(Error::request_failed(
                operation,
                Some(status.as_u16()),
                detail,
            ));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(operation, request).await?;
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|error| {
            tracing::warn!("{}: invalid response body: {}", operation.failure_message(), error);
            Error::request_failed(
                operation,
                Some(status),
                format!("invalid response body: {error}"),
            )
        })
    }
}

impl ScrapbookApi for ScrapbookClient {
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>> {
        let entries: Vec<Entry> = self
            .send_json(ApiOperation::ListEntries, self.list_entries_request(query))
            .await?;
        tracing::debug!("Received {} entries", entries.len());
        Ok(entries)
    }

    async fn get_entry(&self, id: EntryId) -> Result<Entry> {
        let request = self.client.get(self.url(&format!("/entries/{id}")));
        self.send_json(ApiOperation::GetEntry, request).await
    }

    async fn create_entry(&self, fields: &EntryFields, image: ImageUpload) -> Result<Entry> {
        let request = self.create_entry_request(fields, image)?;
        let entry: Entry = self.send_json(ApiOperation::CreateEntry, request).await?;
        tracing::debug!("Entry {} created", entry.id);
        Ok(entry)
    }

    async fn update_entry(
        &self,
        id: EntryId,
        fields: &EntryFields,
        image: Option<ImageUpload>,
    ) -> Result<Entry> {
        let request = self.update_entry_request(id, fields, image)?;
        self.send_json(ApiOperation::UpdateEntry, request).await
    }

    async fn delete_entry(&self, id: EntryId) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/entries/{id}")));
        self.send(ApiOperation::DeleteEntry, request).await?;
        Ok(())
    }

    async fn list_deleted(&self) -> Result<Vec<DeletedEntry>> {
        let request = self.client.get(self.url("/deleted-entries/"));
        let entries: Vec<DeletedEntry> = self.send_json(ApiOperation::ListDeleted, request).await?;
        tracing::debug!("Received {} deleted entries", entries.len());
        Ok(entries)
    }

    async fn restore_entry(&self, id: EntryId) -> Result<Entry> {
        let request = self
            .client
            .post(self.url(&format!("/deleted-entries/{id}/restore")));
        self.send_json(ApiOperation::RestoreEntry, request).await
    }

    async fn purge_entry(&self, id: EntryId) -> Result<()> {
        let request = self.client.delete(self.url(&format!("/deleted-entries/{id}")));
        self.send(ApiOperation::PurgeEntry, request).await?;
        Ok(())
    }

    async fn toggle_favorite(&self, id: EntryId) -> Result<Entry> {
        let request = self.client.post(self.url(&format!("/entries/{id}/favorite")));
        self.send_json(ApiOperation::ToggleFavorite, request).await
    }

    async fn upload_image(&self, image: ImageUpload) -> Result<UploadReceipt> {
        let part = image_part(image, ApiOperation::UploadImage)?;
        let request = self
            .client
            .post(self.url("/upload"))
            .multipart(Form::new().part("file", part));
        self.send_json(ApiOperation::UploadImage, request).await
    }
}

fn body_excerpt(body: &str) -> String {
    body.trim().chars().take(ERROR_EXCERPT_CHARS).collect()
}

fn entry_form(
    fields: &EntryFields,
    image: Option<ImageUpload>,
    operation: ApiOperation,
) -> Result<Form> {
    let form = Form::new()
        .text("title", fields.title.clone())
        .text("date", fields.date.clone())
        .text("story", fields.story.clone());
    match image {
        Some(image) => Ok(form.part("file", image_part(image, operation)?)),
        None => Ok(form),
    }
}

fn image_part(image: ImageUpload, operation: ApiOperation) -> Result<Part> {
    Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&image.content_type)
        .map_err(|error| Error::request_failed(operation, None, error.to_string()))
}
