//! PageLinkStore implementation for PgStorage.

use super::*;

use crate::traits::PageLinkStore;
use async_trait::async_trait;
use feedrelay_core::NewPageLink;

#[async_trait]
impl PageLinkStore for PgStorage {
    async fn insert_page_links(&self, links: &[NewPageLink]) -> Result<usize, StorageError> {
        if links.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        for link in links {
            sqlx::query(
                "INSERT INTO page_links (feed_link, feed_title, page_link) VALUES ($1, $2, $3)",
            )
            .bind(&link.feed_link)
            .bind(&link.feed_title)
            .bind(&link.page_link)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(links.len())
    }

    async fn page_links_for(&self, feed_link: &str) -> Result<Vec<PageLink>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {PAGE_LINK_COLUMNS} FROM page_links WHERE feed_link = $1 ORDER BY id ASC"
        ))
        .bind(feed_link)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_page_link).collect()
    }
}
