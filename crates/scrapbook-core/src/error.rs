//! Error types for scrapbook-core

use thiserror::Error;

/// Result type alias using scrapbook-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Backend capability a request was issued for.
///
/// Each operation carries the fixed message shown to users when its request
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    ListEntries,
    GetEntry,
    CreateEntry,
    UpdateEntry,
    DeleteEntry,
    ListDeleted,
    RestoreEntry,
    PurgeEntry,
    ToggleFavorite,
    UploadImage,
}

impl ApiOperation {
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::ListEntries => "Failed to fetch entries",
            Self::GetEntry => "Failed to fetch entry",
            Self::CreateEntry => "Failed to create entry",
            Self::UpdateEntry => "Failed to update entry",
            Self::DeleteEntry => "Failed to delete entry",
            Self::ListDeleted => "Failed to fetch deleted entries",
            Self::RestoreEntry => "Failed to restore entry",
            Self::PurgeEntry => "Failed to permanently delete entry",
            Self::ToggleFavorite => "Failed to toggle favorite",
            Self::UploadImage => "Failed to upload file",
        }
    }
}

/// Errors that can occur in scrapbook-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Any failed backend request: non-success status, transport failure, or
    /// an undecodable body. Only the per-operation message is displayed.
    #[error("{}", .operation.failure_message())]
    RequestFailed {
        operation: ApiOperation,
        status: Option<u16>,
        detail: String,
    },

    /// Invalid client configuration (base URL, HTTP client setup)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Failure of `operation`, with the HTTP status when there was one.
    pub fn request_failed(
        operation: ApiOperation,
        status: Option<u16>,
        detail: impl Into<String>,
    ) -> Self {
        Self::RequestFailed {
            operation,
            status,
            detail: detail.into(),
        }
    }

    /// HTTP status of a failed request, when the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}
