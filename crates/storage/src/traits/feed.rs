use async_trait::async_trait;
use feedrelay_core::{FeedEntry, NewFeedEntry, NewPageLink, PageLink};

use crate::error::StorageError;

/// Feed entry persistence. Entries are insert-only.
#[async_trait]
pub trait FeedEntryStore: Send + Sync {
    /// Look up an entry by its feed link (the dedup key).
    async fn find_feed_entry(&self, link: &str) -> Result<Option<FeedEntry>, StorageError>;

    /// Insert an entry. Returns `false` if an entry with the same link already exists.
    async fn insert_feed_entry(&self, entry: &NewFeedEntry) -> Result<bool, StorageError>;

    /// Most recently inserted entries, newest first.
    async fn recent_feed_entries(&self, limit: usize) -> Result<Vec<FeedEntry>, StorageError>;
}

/// Scraped page link persistence. Links are insert-only.
#[async_trait]
pub trait PageLinkStore: Send + Sync {
    /// Insert all links in one transaction. Returns the number of rows written.
    async fn insert_page_links(&self, links: &[NewPageLink]) -> Result<usize, StorageError>;

    /// Links scraped for the given feed link, in insertion order.
    async fn page_links_for(&self, feed_link: &str) -> Result<Vec<PageLink>, StorageError>;
}
