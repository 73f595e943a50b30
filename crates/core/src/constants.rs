//! Shared constants for feedrelay.

/// Maximum number of results for any listing query.
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Default number of results when limit is not specified by the caller.
pub const DEFAULT_QUERY_LIMIT: usize = 20;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 10;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Telegram rejects `sendMessage` texts longer than this many UTF-16 code units.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// Feed polled when `FEEDRELAY_FEED_URL` is not set.
pub const DEFAULT_FEED_URL: &str = "https://elektrobeats.org/music?task=rss";

/// Prefix stripped from feed links to obtain the page id.
pub const DEFAULT_SITE_BASE: &str = "https://elektrobeats.org/";

/// Endpoint returning the download-link fragment for a page id.
pub const DEFAULT_DOWNLOAD_ENDPOINT: &str =
    "https://elektrobeats.org/music.php?task=getdownloadlink";

/// Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Seconds between feed polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

/// Per-request HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
