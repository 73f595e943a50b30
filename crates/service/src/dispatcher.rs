//! Routes queued tasks to the pipeline step that handles them.

use std::sync::Arc;

use feedrelay_core::{env_parse_with_default, Config, Task};
use feedrelay_fetch::{FeedClient, HttpFetcher, PageScraper};
use feedrelay_notify::TelegramNotifier;
use feedrelay_storage::traits::TaskQueueStore;
use feedrelay_storage::{QueuedTask, StorageBackend, default_visibility_timeout_secs};
use serde::Serialize;

use crate::{FeedService, NotifyService, ScrapeService, ServiceError};

/// Outcome of draining the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Ceiling for the exponential retry back-off.
const MAX_RETRY_BACKOFF_SECS: i64 = 3600;

/// Base delay before a transiently failed task is retried
/// (`FEEDRELAY_RETRY_BACKOFF_SECS`, default 30). Doubles with every failed attempt.
fn default_retry_backoff_secs() -> i64 {
    env_parse_with_default("FEEDRELAY_RETRY_BACKOFF_SECS", 30_i64)
}

/// Seconds to hold a task back after its `failed_attempts`-th failure.
///
/// A wait requested by the remote side wins over the back-off.
pub(crate) fn retry_delay_secs(err: &ServiceError, failed_attempts: i32, base_secs: i64) -> i64 {
    if let Some(hint) = err.retry_after_secs() {
        return i64::try_from(hint).unwrap_or(MAX_RETRY_BACKOFF_SECS);
    }
    let shift = u32::try_from(failed_attempts.clamp(0, 16)).unwrap_or(0);
    base_secs.max(0).saturating_mul(1_i64 << shift).min(MAX_RETRY_BACKOFF_SECS)
}

pub struct TaskDispatcher {
    storage: Arc<StorageBackend>,
    feeds: FeedService,
    scrapes: ScrapeService,
    notifications: NotifyService,
    retry_backoff_secs: i64,
}

impl TaskDispatcher {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        feeds: FeedService,
        scrapes: ScrapeService,
        notifications: NotifyService,
    ) -> Self {
        Self {
            storage,
            feeds,
            scrapes,
            notifications,
            retry_backoff_secs: default_retry_backoff_secs(),
        }
    }

    /// Override the base retry back-off.
    #[must_use]
    pub const fn with_retry_backoff(mut self, secs: i64) -> Self {
        self.retry_backoff_secs = secs;
        self
    }

    /// Wires the pipeline from configuration: one shared HTTP client for feed and
    /// page fetches, plus a Telegram client when a token is configured.
    pub fn from_config(config: &Config, storage: Arc<StorageBackend>) -> Result<Self, ServiceError> {
        let fetcher = HttpFetcher::new(config.http_timeout)?;
        let feeds = FeedService::new(Arc::clone(&storage), FeedClient::new(fetcher.clone()));
        let scrapes = ScrapeService::new(
            Arc::clone(&storage),
            PageScraper::new(fetcher, config.page_source.clone()),
        );
        let notifier = config
            .telegram
            .as_ref()
            .map(|telegram| TelegramNotifier::new(telegram, config.http_timeout))
            .transpose()?;
        if notifier.is_none() {
            tracing::warn!("TELEGRAM_TOKEN not set, notifications are disabled");
        }
        Ok(Self::new(storage, feeds, scrapes, NotifyService::new(notifier)))
    }

    #[must_use]
    pub const fn feeds(&self) -> &FeedService {
        &self.feeds
    }

    #[must_use]
    pub const fn notifications(&self) -> &NotifyService {
        &self.notifications
    }

    /// Run the step a task stands for.
    pub async fn dispatch(&self, task: &Task) -> Result<(), ServiceError> {
        match task {
            Task::PollFeed { feed_url } => {
                self.feeds.poll(feed_url).await?;
            },
            Task::ScrapePage { feed_link, feed_title } => {
                self.scrapes.scrape(feed_link, feed_title).await?;
            },
            Task::SendNotification { message } => {
                if !self.notifications.is_configured() {
                    tracing::debug!("notifications disabled, dropping message");
                    return Ok(());
                }
                self.notifications.send(message).await?;
            },
        }
        Ok(())
    }

    /// Dispatch a claimed task and settle it in the queue.
    ///
    /// Returns whether the task succeeded. Transient failures go back to the queue
    /// and become claimable again after a back-off (or the wait Telegram asked
    /// for); anything else is dead-lettered immediately.
    pub async fn process(&self, queued: &QueuedTask) -> Result<bool, ServiceError> {
        let kind = queued.task.kind();
        match self.dispatch(&queued.task).await {
            Ok(()) => {
                self.storage.complete_task(queued.id).await?;
                tracing::debug!(task_id = queued.id, %kind, "task completed");
                Ok(true)
            },
            Err(e) => {
                let retry_after = e
                    .is_transient()
                    .then(|| retry_delay_secs(&e, queued.retry_count, self.retry_backoff_secs));
                tracing::warn!(
                    task_id = queued.id,
                    %kind,
                    attempt = queued.retry_count.saturating_add(1),
                    retry_after_secs = ?retry_after,
                    error = %e,
                    "task failed"
                );
                self.storage.fail_task(queued.id, &e.to_string(), retry_after).await?;
                Ok(false)
            },
        }
    }

    /// Claim and process tasks one at a time until the queue is empty or `max`
    /// tasks have been processed. Tasks enqueued along the way are picked up too.
    pub async fn drain(&self, max: usize) -> Result<DrainReport, ServiceError> {
        let mut report = DrainReport::default();
        while report.processed < max {
            let claimed =
                self.storage.claim_tasks(1, default_visibility_timeout_secs()).await?;
            let Some(queued) = claimed.first() else {
                break;
            };
            if self.process(queued).await? {
                report.succeeded = report.succeeded.saturating_add(1);
            } else {
                report.failed = report.failed.saturating_add(1);
            }
            report.processed = report.processed.saturating_add(1);
        }
        tracing::info!(
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            "queue drained"
        );
        Ok(report)
    }
}
