use async_trait::async_trait;
use feedrelay_core::Task;

use crate::error::StorageError;
use crate::task_queue::{QueueStats, QueuedTask};

/// Durable task queue operations.
#[async_trait]
pub trait TaskQueueStore: Send + Sync {
    /// Queue a task for processing. Returns the new task ID.
    async fn enqueue_task(&self, task: &Task) -> Result<i64, StorageError>;

    /// Claim up to `limit` tasks, oldest first. Pending tasks are skipped until
    /// their `available_at_epoch`. Tasks claimed longer than
    /// `visibility_timeout_secs` ago are claimable again.
    async fn claim_tasks(
        &self,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<QueuedTask>, StorageError>;

    /// Delete a task after successful processing.
    async fn complete_task(&self, id: i64) -> Result<(), StorageError>;

    /// Record a failed attempt.
    ///
    /// With `Some(delay)` the task goes back to pending, claimable again after
    /// `delay` seconds, until `max_retry_count()` attempts have failed. With
    /// `None` it is failed at once.
    async fn fail_task(
        &self,
        id: i64,
        error: &str,
        retry_after_secs: Option<i64>,
    ) -> Result<(), StorageError>;

    /// Release stale processing tasks back to pending.
    async fn release_stale_tasks(&self, visibility_timeout_secs: i64)
    -> Result<usize, StorageError>;

    /// Failed tasks, newest first.
    async fn get_failed_tasks(&self, limit: usize) -> Result<Vec<QueuedTask>, StorageError>;

    /// Get queue statistics.
    async fn get_queue_stats(&self) -> Result<QueueStats, StorageError>;

    /// Reset failed tasks back to pending with a fresh retry budget.
    async fn retry_failed_tasks(&self) -> Result<usize, StorageError>;

    /// Delete all failed tasks.
    async fn clear_failed_tasks(&self) -> Result<usize, StorageError>;

    /// Delete failed tasks older than `ttl_secs` (dead letter garbage collection).
    async fn clear_stale_failed_tasks(&self, ttl_secs: i64) -> Result<usize, StorageError>;
}
