use std::sync::Arc;

use feedrelay_core::{FeedEntry, PageLink, MAX_QUERY_LIMIT};
use feedrelay_storage::traits::{FeedEntryStore, PageLinkStore, StatsStore};
use feedrelay_storage::{StorageBackend, StorageStats};

use crate::ServiceError;

/// Read-only views over what the pipeline has stored.
pub struct CatalogService {
    storage: Arc<StorageBackend>,
}

impl CatalogService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn recent_entries(&self, limit: usize) -> Result<Vec<FeedEntry>, ServiceError> {
        Ok(self.storage.recent_feed_entries(limit.min(MAX_QUERY_LIMIT)).await?)
    }

    pub async fn links_for(&self, feed_link: &str) -> Result<Vec<PageLink>, ServiceError> {
        if feed_link.trim().is_empty() {
            return Err(ServiceError::InvalidInput("feed link is empty".to_owned()));
        }
        Ok(self.storage.page_links_for(feed_link).await?)
    }

    pub async fn stats(&self) -> Result<StorageStats, ServiceError> {
        Ok(self.storage.get_stats().await?)
    }
}
