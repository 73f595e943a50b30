use async_trait::async_trait;

use crate::error::StorageError;
use crate::task_queue::StorageStats;

#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn get_stats(&self) -> Result<StorageStats, StorageError>;
}
