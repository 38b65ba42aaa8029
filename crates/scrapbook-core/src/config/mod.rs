//! Client configuration.
//!
//! Resolves the backend base URL from, in order: an explicit value (CLI
//! flag), the `SCRAPBOOK_API_URL` environment variable, a stored profile, and
//! finally the local development default.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::non_blank;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "SCRAPBOOK_API_URL";

/// Where the resolved base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiUrlSource {
    Flag,
    Environment,
    Profile,
    Default,
}

impl fmt::Display for ApiUrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Flag => "--api-url",
            Self::Environment => API_URL_ENV,
            Self::Profile => "profile",
            Self::Default => "default",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub source: ApiUrlSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            source: ApiUrlSource::Default,
        }
    }
}

impl ClientConfig {
    /// Pick the first non-blank candidate and validate it.
    pub fn resolve(
        explicit: Option<String>,
        environment: Option<String>,
        profile: Option<String>,
    ) -> Result<Self> {
        let candidates = [
            (explicit, ApiUrlSource::Flag),
            (environment, ApiUrlSource::Environment),
            (profile, ApiUrlSource::Profile),
        ];
        for (candidate, source) in candidates {
            if let Some(raw) = non_blank(candidate) {
                return Ok(Self {
                    api_base_url: normalize_base_url(&raw)?,
                    source,
                });
            }
        }
        Ok(Self::default())
    }

    /// Same as [`Self::resolve`], reading the environment variable itself.
    pub fn from_env(explicit: Option<String>, profile: Option<String>) -> Result<Self> {
        Self::resolve(explicit, std::env::var(API_URL_ENV).ok(), profile)
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Trim whitespace and trailing slashes; require an http(s) scheme.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let value = non_blank(Some(raw.to_string())).ok_or_else(|| {
        Error::InvalidConfiguration("API base URL must not be empty".to_string())
    })?;
    if !is_http_url(&value) {
        return Err(Error::InvalidConfiguration(format!(
            "API base URL '{value}' must include http:// or https://"
        )));
    }
    Ok(value.trim_end_matches('/').to_string())
}
