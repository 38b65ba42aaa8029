//! scrapbook-core - Core library for The Scrapbook
//!
//! This crate contains the entry models, the backend API client, list query
//! composition, and the view state used by the Scrapbook CLI.

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod query;
pub mod state;

pub use api::{ScrapbookApi, ScrapbookClient};
pub use config::ClientConfig;
pub use error::{ApiOperation, Error, Result};
pub use models::{DeletedEntry, Entry, EntryFields, EntryId, ImageUpload, UploadReceipt};
pub use query::{EntryQuery, QueryController, SortKey, SortOrder};
pub use state::{DeletedCollection, EntryCollection, LoadPhase, Outcome, RefreshReason};
