use std::sync::Arc;

use feedrelay_core::Task;
use feedrelay_storage::traits::TaskQueueStore;
use feedrelay_storage::{QueueStats, QueuedTask, StorageBackend};

use crate::ServiceError;

pub struct QueueService {
    storage: Arc<StorageBackend>,
}

impl QueueService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn enqueue(&self, task: &Task) -> Result<i64, ServiceError> {
        Ok(self.storage.enqueue_task(task).await?)
    }

    pub async fn get_queue_stats(&self) -> Result<QueueStats, ServiceError> {
        Ok(self.storage.get_queue_stats().await?)
    }

    pub async fn claim_tasks(
        &self,
        max: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<QueuedTask>, ServiceError> {
        Ok(self.storage.claim_tasks(max, visibility_timeout_secs).await?)
    }

    pub async fn get_failed_tasks(&self, limit: usize) -> Result<Vec<QueuedTask>, ServiceError> {
        Ok(self.storage.get_failed_tasks(limit).await?)
    }

    pub async fn clear_failed_tasks(&self) -> Result<usize, ServiceError> {
        Ok(self.storage.clear_failed_tasks().await?)
    }

    pub async fn clear_stale_failed_tasks(&self, ttl_secs: i64) -> Result<usize, ServiceError> {
        Ok(self.storage.clear_stale_failed_tasks(ttl_secs).await?)
    }

    pub async fn retry_failed_tasks(&self) -> Result<usize, ServiceError> {
        Ok(self.storage.retry_failed_tasks().await?)
    }

    pub async fn release_stale_tasks(
        &self,
        visibility_timeout_secs: i64,
    ) -> Result<usize, ServiceError> {
        Ok(self.storage.release_stale_tasks(visibility_timeout_secs).await?)
    }
}
