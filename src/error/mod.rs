use std::path::PathBuf;

use thiserror::Error;

/// Why scraping a linked page failed.
///
/// Every variant is recovered from the same way (see
/// `MetadataResolver::resolve`); the variants exist so logs can tell them
/// apart.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Network(reqwest::Error),

    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Failed to read response body: {0}")]
    Body(reqwest::Error),
}

impl FetchError {
    /// Short label used as the `kind` field in diagnostic logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(e) if e.is_timeout() => "timeout",
            FetchError::Network(_) => "network",
            FetchError::Status(_) => "http_status",
            FetchError::Body(_) => "parse",
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error("Failed to read links file {path}: {source}")]
    LinksFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed links file: {0}")]
    LinksFormat(#[from] serde_json::Error),

    #[error("Invalid link URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Link list is empty")]
    NoLinks,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),

    #[error("Invalid rate limit: {max_requests} requests every {replenish_secs}s")]
    RateLimit {
        max_requests: u32,
        replenish_secs: u64,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
