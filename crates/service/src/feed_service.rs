use std::sync::Arc;

use feedrelay_core::{FeedItem, Task};
use feedrelay_fetch::FeedClient;
use feedrelay_storage::traits::{FeedEntryStore, TaskQueueStore};
use feedrelay_storage::StorageBackend;
use serde::Serialize;

use crate::ServiceError;

/// Outcome of one feed poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    /// Entries with a usable link found in the feed.
    pub seen: usize,
    /// Entries stored for the first time (one scrape task each).
    pub inserted: usize,
    /// Entries already known.
    pub skipped: usize,
}

pub struct FeedService {
    storage: Arc<StorageBackend>,
    feeds: FeedClient,
}

impl FeedService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, feeds: FeedClient) -> Self {
        Self { storage, feeds }
    }

    /// Fetch `feed_url` and run every entry through [`Self::ingest_entry`].
    pub async fn poll(&self, feed_url: &str) -> Result<PollReport, ServiceError> {
        let items = self.feeds.fetch(feed_url).await?;
        let mut report = PollReport { seen: items.len(), ..PollReport::default() };

        for item in &items {
            if self.ingest_entry(item).await? {
                report.inserted = report.inserted.saturating_add(1);
            } else {
                report.skipped = report.skipped.saturating_add(1);
            }
        }

        tracing::info!(
            feed_url,
            seen = report.seen,
            inserted = report.inserted,
            skipped = report.skipped,
            "feed polled"
        );
        Ok(report)
    }

    /// Store an entry the first time its link is seen and schedule its scrape.
    ///
    /// Returns `false` when the link is already known.
    pub async fn ingest_entry(&self, item: &FeedItem) -> Result<bool, ServiceError> {
        if self.storage.find_feed_entry(&item.link).await?.is_some() {
            tracing::debug!(link = %item.link, "entry already stored");
            return Ok(false);
        }

        if !self.storage.insert_feed_entry(&item.to_new_entry()).await? {
            tracing::debug!(link = %item.link, "entry stored concurrently, skipping");
            return Ok(false);
        }

        let task_id = self
            .storage
            .enqueue_task(&Task::ScrapePage {
                feed_link: item.link.clone(),
                feed_title: item.title.clone(),
            })
            .await?;
        tracing::info!(link = %item.link, title = %item.title, task_id, "new entry, scrape queued");
        Ok(true)
    }
}
