//! Typed error enum for the service layer.
//!
//! Unifies storage, fetch and notification failures into a single error type,
//! so the task dispatcher can decide between retrying and dead-lettering.

use feedrelay_fetch::FetchError;
use feedrelay_notify::NotifyError;
use feedrelay_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying storage, fetch and notification failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Feed or page fetch failed.
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),

    /// Telegram call failed.
    #[error("notify: {0}")]
    Notify(#[from] NotifyError),

    /// Caller provided invalid input (empty text, malformed data).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Required backend (Telegram, database) is not configured.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Fetch(e) => e.is_transient(),
            Self::Notify(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Wait in seconds the remote side asked for before trying again.
    pub const fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Notify(e) => e.retry_after_secs(),
            _ => None,
        }
    }
}
