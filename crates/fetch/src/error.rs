//! Typed error enum for the fetch crate.

use thiserror::Error;

/// Errors from fetching and parsing remote documents.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP status {code} from {url}")]
    HttpStatus { code: u16, url: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("all retries exhausted, last error: {0}")]
    RetriesExhausted(Box<FetchError>),
}

impl FetchError {
    /// Whether a later attempt could succeed.
    ///
    /// `RetriesExhausted` only ever wraps transient errors, so it stays transient:
    /// the task queue gets another go at it after the in-process retries.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) | Self::RetriesExhausted(_) => true,
            Self::HttpStatus { code, .. } => *code == 429 || (500..600).contains(code),
            Self::Parse(_) | Self::InvalidUrl { .. } | Self::ClientInit(_) => false,
        }
    }
}
