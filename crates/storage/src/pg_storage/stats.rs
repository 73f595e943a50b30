use super::*;

use crate::task_queue::StorageStats;
use crate::traits::StatsStore;
use async_trait::async_trait;

#[async_trait]
impl StatsStore for PgStorage {
    async fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let row = sqlx::query(
            "SELECT
               (SELECT COUNT(*) FROM feed_entries) as feed_entries,
               (SELECT COUNT(*) FROM page_links) as page_links",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(StorageStats {
            feed_entries: u64::try_from(row.try_get::<i64, _>("feed_entries")?).unwrap_or(0),
            page_links: u64::try_from(row.try_get::<i64, _>("page_links")?).unwrap_or(0),
        })
    }
}
