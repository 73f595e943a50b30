use thiserror::Error;

/// Telegram API errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Telegram API returned an error
    #[error("Telegram API error {code}: {description}")]
    Api { code: u16, description: String },

    /// Telegram asked us to slow down
    #[error("Telegram rate limit, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl NotifyError {
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited { .. } => true,
            Self::Api { code, .. } => (500..600).contains(code),
            Self::ClientInit(_) => false,
        }
    }

    /// Seconds Telegram asked us to wait before the next call, if it said.
    #[must_use]
    pub const fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}
