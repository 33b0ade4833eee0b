//! Error and rejection types for the scrape pipeline.
//!
//! Failures are split by the stage that produced them so that callers can
//! decide locally what is fatal:
//!
//! | Type | Raised by | Fatal to the session? |
//! |------|-----------|------------------------|
//! | [`FetchError`] | [`crate::fetcher`] | only for the primary page |
//! | [`ParseError`] | extractor and URL resolver | only for the primary page |
//! | [`SaveError`] | [`crate::outputs::store`] | only for the article text |
//! | [`Rejection`] | media filter | never, it is a policy outcome |

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// HTTP retrieval failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    /// Classify a `reqwest` failure for `url`.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// The page or one of its URLs could not be interpreted.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("page url {0} has no host")]
    MissingHost(String),
}

/// Filesystem write failure in the content store.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct SaveError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Why a media candidate was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("url matches deny-listed keyword {keyword:?}")]
    Keyword { keyword: String },

    #[error("url could not be resolved: {message}")]
    Unresolvable { message: String },

    #[error("download failed: {message}")]
    Fetch { message: String },

    #[error("image is {width}x{height}, below the {min_width}x{min_height} floor")]
    TooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("image could not be decoded: {message}")]
    Undecodable { message: String },

    #[error("content hash {hash} already saved in this session")]
    Duplicate { hash: String },

    #[error("save failed: {message}")]
    Save { message: String },
}

impl Rejection {
    /// Log event category for this rejection.
    pub fn event(&self) -> &'static str {
        match self {
            Rejection::Keyword { .. } => "skip-filtered",
            Rejection::TooSmall { .. } | Rejection::Undecodable { .. } => "skip-too-small",
            Rejection::Duplicate { .. } => "skip-duplicate",
            Rejection::Unresolvable { .. } | Rejection::Fetch { .. } | Rejection::Save { .. } => {
                "error"
            }
        }
    }
}

/// Session-level failure: nothing beyond what was already written is produced.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch article page: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to parse article page: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to save article text: {0}")]
    Save(#[from] SaveError),
}
