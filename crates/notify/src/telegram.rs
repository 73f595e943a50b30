use std::time::Duration;

use feedrelay_core::TelegramConfig;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::error::NotifyError;

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.api_url)
            .field("token", &"***")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

/// Error body of a failed Bot API call.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

impl TelegramNotifier {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &TelegramConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    /// Send a Markdown text message to the configured chat.
    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);

        let resp = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "Markdown",
                "disable_web_page_preview": true,
            }))
            .send()
            .await?;

        let status = resp.status();
        if matches!(status, StatusCode::OK | StatusCode::ACCEPTED) {
            tracing::debug!(code = status.as_u16(), chars = text.chars().count(), "telegram message sent");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
        tracing::warn!(code = status.as_u16(), body = %body, "telegram sendMessage rejected");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NotifyError::RateLimited {
                retry_after: parsed.parameters.and_then(|p| p.retry_after),
            });
        }
        Err(NotifyError::Api {
            code: status.as_u16(),
            description: parsed.description.unwrap_or(body),
        })
    }
}
