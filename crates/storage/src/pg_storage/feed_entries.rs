//! FeedEntryStore implementation for PgStorage.

use super::*;

use crate::traits::FeedEntryStore;
use async_trait::async_trait;
use feedrelay_core::NewFeedEntry;

#[async_trait]
impl FeedEntryStore for PgStorage {
    async fn find_feed_entry(&self, link: &str) -> Result<Option<FeedEntry>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {FEED_ENTRY_COLUMNS} FROM feed_entries WHERE link = $1 LIMIT 1"
        ))
        .bind(link)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_feed_entry).transpose()
    }

    async fn insert_feed_entry(&self, entry: &NewFeedEntry) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "INSERT INTO feed_entries (link, title) VALUES ($1, $2)
               ON CONFLICT (link) DO NOTHING",
        )
        .bind(&entry.link)
        .bind(&entry.title)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn recent_feed_entries(&self, limit: usize) -> Result<Vec<FeedEntry>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {FEED_ENTRY_COLUMNS} FROM feed_entries ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(usize_to_i64(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_feed_entry).collect()
    }
}
