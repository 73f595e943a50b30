//! Request and response bodies of the admin API.

use feedrelay_core::{DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT};
use feedrelay_storage::{QueueStats, QueuedTask, StorageStats};
use serde::{Deserialize, Serialize};

const fn default_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl LimitQuery {
    /// Cap limit to prevent unbounded queries.
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct LinksQuery {
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub storage: &'static str,
    pub entries: StorageStats,
    pub queue: QueueStats,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub stats: QueueStats,
    pub failed: Vec<QueuedTask>,
}

#[derive(Debug, Serialize)]
pub struct ClearQueueResponse {
    pub cleared: usize,
}

#[derive(Debug, Serialize)]
pub struct RetryQueueResponse {
    pub retried: usize,
}

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub task_id: i64,
    pub feed_url: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessingStatusResponse {
    pub active: bool,
    pub pending: u64,
}

#[derive(Debug, Deserialize)]
pub struct SetProcessingRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct SetProcessingResponse {
    pub active: bool,
}
