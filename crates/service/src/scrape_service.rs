use std::sync::Arc;

use feedrelay_core::{NewPageLink, Task};
use feedrelay_fetch::PageScraper;
use feedrelay_notify::format_download_message;
use feedrelay_storage::traits::{PageLinkStore, TaskQueueStore};
use feedrelay_storage::StorageBackend;

use crate::ServiceError;

pub struct ScrapeService {
    storage: Arc<StorageBackend>,
    scraper: PageScraper,
}

impl ScrapeService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, scraper: PageScraper) -> Self {
        Self { storage, scraper }
    }

    /// Scrape the page behind `feed_link`, store its links and queue the notification.
    ///
    /// A page without links stores nothing and notifies nobody. When links for
    /// `feed_link` are already stored (an earlier attempt failed after inserting
    /// them), the page is not fetched again and only the notification is queued.
    /// Returns the number of links stored by this call.
    pub async fn scrape(&self, feed_link: &str, feed_title: &str) -> Result<usize, ServiceError> {
        let existing = self.storage.page_links_for(feed_link).await?;
        let (links, stored) = if existing.is_empty() {
            let links = self.scraper.scrape(feed_link).await?;
            if links.is_empty() {
                tracing::info!(feed_link, "no links on page, nothing to store");
                return Ok(0);
            }
            let rows = NewPageLink::for_entry(feed_link, feed_title, &links);
            let stored = self.storage.insert_page_links(&rows).await?;
            (links, stored)
        } else {
            tracing::info!(
                feed_link,
                count = existing.len(),
                "links already stored, not scraping again"
            );
            (existing.into_iter().map(|l| l.page_link).collect::<Vec<_>>(), 0)
        };

        let message = format_download_message(feed_title, &links);
        self.storage.enqueue_task(&Task::SendNotification { message }).await?;

        tracing::info!(feed_link, stored, "page links stored, notification queued");
        Ok(stored)
    }
}
