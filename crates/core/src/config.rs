//! Runtime configuration read from the environment.

use std::time::Duration;

use crate::{
    parse_with_default, ConfigError, DEFAULT_DOWNLOAD_ENDPOINT, DEFAULT_FEED_URL,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SITE_BASE,
    DEFAULT_TELEGRAM_API_URL,
};

/// How the secondary page for a feed link is located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// Fetch the feed link itself.
    Direct,
    /// Ask a site endpoint for the download fragment of the page whose id is the
    /// feed link with `site_base` stripped.
    DownloadEndpoint { site_base: String, endpoint: String },
}

impl Default for PageSource {
    fn default() -> Self {
        Self::DownloadEndpoint {
            site_base: DEFAULT_SITE_BASE.to_owned(),
            endpoint: DEFAULT_DOWNLOAD_ENDPOINT.to_owned(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_url: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"***")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub feed_url: String,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    pub page_source: PageSource,
    /// `None` disables notifications.
    pub telegram: Option<TelegramConfig>,
    /// `None` when no PostgreSQL settings are present.
    pub database_url: Option<String>,
}

impl Config {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError` for partially set credentials or an unknown scrape mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let poll_secs = parse_with_default(
            "FEEDRELAY_POLL_INTERVAL_SECS",
            get("FEEDRELAY_POLL_INTERVAL_SECS"),
            DEFAULT_POLL_INTERVAL_SECS,
        );
        let timeout_secs = parse_with_default(
            "FEEDRELAY_HTTP_TIMEOUT_SECS",
            get("FEEDRELAY_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        );
        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "FEEDRELAY_POLL_INTERVAL_SECS",
                reason: "must be greater than zero".to_owned(),
            });
        }

        Ok(Self {
            feed_url: get("FEEDRELAY_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_owned()),
            poll_interval: Duration::from_secs(poll_secs),
            http_timeout: Duration::from_secs(timeout_secs),
            page_source: page_source(&get)?,
            telegram: telegram(&get)?,
            database_url: database_url(&get)?,
        })
    }
}

fn page_source(get: &impl Fn(&str) -> Option<String>) -> Result<PageSource, ConfigError> {
    match get("FEEDRELAY_SCRAPE_MODE").as_deref() {
        None | Some("download-endpoint") => Ok(PageSource::DownloadEndpoint {
            site_base: get("FEEDRELAY_SITE_BASE").unwrap_or_else(|| DEFAULT_SITE_BASE.to_owned()),
            endpoint: get("FEEDRELAY_DOWNLOAD_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_ENDPOINT.to_owned()),
        }),
        Some("direct") => Ok(PageSource::Direct),
        Some(other) => Err(ConfigError::Invalid {
            var: "FEEDRELAY_SCRAPE_MODE",
            reason: format!("expected 'direct' or 'download-endpoint', got '{other}'"),
        }),
    }
}

fn telegram(
    get: &impl Fn(&str) -> Option<String>,
) -> Result<Option<TelegramConfig>, ConfigError> {
    let Some(token) = get("TELEGRAM_TOKEN") else {
        return Ok(None);
    };
    let chat_id = get("TELEGRAM_CHAT_ID").ok_or(ConfigError::Missing("TELEGRAM_CHAT_ID"))?;
    let api_url = get("TELEGRAM_API_URL")
        .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_owned())
        .trim_end_matches('/')
        .to_owned();
    Ok(Some(TelegramConfig { token, chat_id, api_url }))
}

fn database_url(get: &impl Fn(&str) -> Option<String>) -> Result<Option<String>, ConfigError> {
    if let Some(url) = get("DATABASE_URL") {
        return Ok(Some(url));
    }
    let parts = [
        ("POSTGRES_HOST", get("POSTGRES_HOST")),
        ("POSTGRES_DB", get("POSTGRES_DB")),
        ("POSTGRES_USER", get("POSTGRES_USER")),
        ("POSTGRES_PASSWORD", get("POSTGRES_PASSWORD")),
    ];
    if parts.iter().all(|(_, v)| v.is_none()) {
        return Ok(None);
    }
    if let Some((name, _)) = parts.iter().find(|(_, v)| v.is_none()) {
        return Err(ConfigError::Missing(*name));
    }
    let [host, db, user, password] = parts.map(|(_, v)| v.unwrap_or_default());
    Ok(Some(format!("postgres://{user}:{password}@{host}/{db}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(600));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.page_source, PageSource::default());
        assert!(config.telegram.is_none());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_database_url_from_postgres_parts() {
        let config = config_from(&[
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_DB", "relay"),
            ("POSTGRES_USER", "app"),
            ("POSTGRES_PASSWORD", "secret"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://app:secret@db/relay"));
    }

    #[test]
    fn test_database_url_wins_over_parts() {
        let config =
            config_from(&[("DATABASE_URL", "postgres://x/y"), ("POSTGRES_HOST", "db")]).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://x/y"));
    }

    #[test]
    fn test_partial_postgres_parts_is_error() {
        let err = config_from(&[("POSTGRES_HOST", "db"), ("POSTGRES_DB", "relay")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("POSTGRES_USER"));
    }

    #[test]
    fn test_telegram_requires_chat_id() {
        let err = config_from(&[("TELEGRAM_TOKEN", "t")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_CHAT_ID"));
    }

    #[test]
    fn test_telegram_config() {
        let config = config_from(&[
            ("TELEGRAM_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100"),
            ("TELEGRAM_API_URL", "http://localhost:9000/"),
        ])
        .unwrap();
        let telegram = config.telegram.unwrap();
        assert_eq!(telegram.chat_id, "-100");
        assert_eq!(telegram.api_url, "http://localhost:9000");
        assert!(!format!("{telegram:?}").contains("123:abc"));
    }

    #[test]
    fn test_direct_scrape_mode() {
        let config = config_from(&[("FEEDRELAY_SCRAPE_MODE", "direct")]).unwrap();
        assert_eq!(config.page_source, PageSource::Direct);
    }

    #[test]
    fn test_unknown_scrape_mode() {
        assert!(config_from(&[("FEEDRELAY_SCRAPE_MODE", "headless")]).is_err());
    }

    #[test]
    fn test_invalid_interval_falls_back() {
        let config = config_from(&[("FEEDRELAY_POLL_INTERVAL_SECS", "soon")]).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(600));
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(config_from(&[("FEEDRELAY_POLL_INTERVAL_SECS", "0")]).is_err());
    }
}
