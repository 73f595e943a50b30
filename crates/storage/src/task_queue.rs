//! Task queue types shared by the storage backends.

use feedrelay_core::{env_parse_with_default, ParseEnumError, Task};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Statistics about storage contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct StorageStats {
    /// Number of feed entries seen so far.
    pub feed_entries: u64,
    /// Number of scraped page links.
    pub page_links: u64,
}

/// Status of a task in the queue. Completed tasks are deleted, not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum TaskStatus {
    /// Waiting to be claimed.
    Pending,
    /// Claimed by a worker.
    Processing,
    /// Retries exhausted or failed permanently.
    Failed,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseEnumError::new("task status", s)),
        }
    }
}

/// A task row in the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct QueuedTask {
    /// Unique database ID.
    pub id: i64,
    /// What to do.
    pub task: Task,
    /// Current processing status.
    pub status: TaskStatus,
    /// Number of failed attempts so far.
    pub retry_count: i32,
    /// Error message of the last failed attempt.
    pub last_error: Option<String>,
    /// Unix timestamp when the task was enqueued.
    pub created_at_epoch: i64,
    /// Unix timestamp when the task was last claimed.
    pub claimed_at_epoch: Option<i64>,
    /// Unix timestamp before which a pending task is not handed out.
    pub available_at_epoch: i64,
}

/// Statistics about the task queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct QueueStats {
    /// Tasks waiting to be claimed.
    pub pending: u64,
    /// Tasks currently claimed.
    pub processing: u64,
    /// Dead-lettered tasks.
    pub failed: u64,
}

/// Attempts allowed before a task is dead-lettered (`FEEDRELAY_MAX_RETRY`, default 3).
#[must_use]
pub fn max_retry_count() -> i32 {
    env_parse_with_default("FEEDRELAY_MAX_RETRY", 3i32)
}

/// Seconds after which a claimed task is considered abandoned
/// (`FEEDRELAY_VISIBILITY_TIMEOUT`, default 300).
#[must_use]
pub fn default_visibility_timeout_secs() -> i64 {
    env_parse_with_default("FEEDRELAY_VISIBILITY_TIMEOUT", 300i64)
}
