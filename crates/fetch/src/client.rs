use std::time::Duration;

use reqwest::header::HeaderMap;
use url::Url;

use crate::error::FetchError;

const MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const USER_AGENT: &str = concat!("feedrelay/", env!("CARGO_PKG_VERSION"));

/// GET-only HTTP client shared by the feed and page fetchers.
///
/// Transient failures (transport errors, 429, 5xx) are retried up to three
/// times with doubling back-off starting at one second.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_delay: Duration,
}

impl HttpFetcher {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_delay: DEFAULT_BASE_DELAY })
    }

    /// Sets the first back-off delay; later ones double it.
    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// GET `url` and return the decoded body.
    ///
    /// # Errors
    /// Returns the first non-transient error, or `RetriesExhausted` wrapping the
    /// last transient one.
    pub async fn get_text(&self, url: &Url, headers: HeaderMap) -> Result<String, FetchError> {
        let mut last_error: Option<FetchError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                tracing::warn!(%url, "fetch retry attempt {attempt}/{MAX_RETRIES} after {delay:?}");
                tokio::time::sleep(delay).await;
            }

            let response =
                match self.client.get(url.clone()).headers(headers.clone()).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        last_error = Some(FetchError::Request(e));
                        continue;
                    },
                };

            let status = response.status();
            if status.is_success() {
                match response.text().await {
                    Ok(body) => return Ok(body),
                    Err(e) => {
                        last_error = Some(FetchError::Request(e));
                        continue;
                    },
                }
            }

            let err = FetchError::HttpStatus { code: status.as_u16(), url: url.to_string() };
            if err.is_transient() {
                last_error = Some(err);
                continue;
            }
            return Err(err);
        }

        Err(FetchError::RetriesExhausted(Box::new(
            last_error.unwrap_or_else(|| FetchError::Parse("no attempt was made".to_owned())),
        )))
    }
}

pub(crate) fn parse_url(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw).map_err(|e| FetchError::InvalidUrl { url: raw.to_owned(), reason: e.to_string() })
}
