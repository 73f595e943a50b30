//! Unified storage backend with enum dispatch.

use async_trait::async_trait;
use feedrelay_core::{FeedEntry, NewFeedEntry, NewPageLink, PageLink, Task};

use crate::error::StorageError;
use crate::task_queue::{QueueStats, QueuedTask, StorageStats};
use crate::traits::{FeedEntryStore, PageLinkStore, StatsStore, TaskQueueStore};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            StorageBackend::Postgres(s) => <crate::pg_storage::PgStorage as $trait>::$method(s, $($arg),*).await,
            StorageBackend::Memory(s) => <crate::memory::MemoryStorage as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    Postgres(crate::pg_storage::PgStorage),
    Memory(crate::memory::MemoryStorage),
}

impl StorageBackend {
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(crate::pg_storage::PgStorage::new(database_url).await?))
    }

    /// Non-persistent backend; everything is lost when the process exits.
    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(crate::memory::MemoryStorage::new())
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

// ── FeedEntryStore ───────────────────────────────────────────────

#[async_trait]
impl FeedEntryStore for StorageBackend {
    async fn find_feed_entry(&self, link: &str) -> Result<Option<FeedEntry>, StorageError> {
        dispatch!(self, FeedEntryStore, find_feed_entry(link))
    }

    async fn insert_feed_entry(&self, entry: &NewFeedEntry) -> Result<bool, StorageError> {
        dispatch!(self, FeedEntryStore, insert_feed_entry(entry))
    }

    async fn recent_feed_entries(&self, limit: usize) -> Result<Vec<FeedEntry>, StorageError> {
        dispatch!(self, FeedEntryStore, recent_feed_entries(limit))
    }
}

// ── PageLinkStore ────────────────────────────────────────────────

#[async_trait]
impl PageLinkStore for StorageBackend {
    async fn insert_page_links(&self, links: &[NewPageLink]) -> Result<usize, StorageError> {
        dispatch!(self, PageLinkStore, insert_page_links(links))
    }

    async fn page_links_for(&self, feed_link: &str) -> Result<Vec<PageLink>, StorageError> {
        dispatch!(self, PageLinkStore, page_links_for(feed_link))
    }
}

// ── TaskQueueStore ───────────────────────────────────────────────

#[async_trait]
impl TaskQueueStore for StorageBackend {
    async fn enqueue_task(&self, task: &Task) -> Result<i64, StorageError> {
        dispatch!(self, TaskQueueStore, enqueue_task(task))
    }

    async fn claim_tasks(
        &self,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<QueuedTask>, StorageError> {
        dispatch!(self, TaskQueueStore, claim_tasks(limit, visibility_timeout_secs))
    }

    async fn complete_task(&self, id: i64) -> Result<(), StorageError> {
        dispatch!(self, TaskQueueStore, complete_task(id))
    }

    async fn fail_task(
        &self,
        id: i64,
        error: &str,
        retry_after_secs: Option<i64>,
    ) -> Result<(), StorageError> {
        dispatch!(self, TaskQueueStore, fail_task(id, error, retry_after_secs))
    }

    async fn release_stale_tasks(
        &self,
        visibility_timeout_secs: i64,
    ) -> Result<usize, StorageError> {
        dispatch!(self, TaskQueueStore, release_stale_tasks(visibility_timeout_secs))
    }

    async fn get_failed_tasks(&self, limit: usize) -> Result<Vec<QueuedTask>, StorageError> {
        dispatch!(self, TaskQueueStore, get_failed_tasks(limit))
    }

    async fn get_queue_stats(&self) -> Result<QueueStats, StorageError> {
        dispatch!(self, TaskQueueStore, get_queue_stats())
    }

    async fn retry_failed_tasks(&self) -> Result<usize, StorageError> {
        dispatch!(self, TaskQueueStore, retry_failed_tasks())
    }

    async fn clear_failed_tasks(&self) -> Result<usize, StorageError> {
        dispatch!(self, TaskQueueStore, clear_failed_tasks())
    }

    async fn clear_stale_failed_tasks(&self, ttl_secs: i64) -> Result<usize, StorageError> {
        dispatch!(self, TaskQueueStore, clear_stale_failed_tasks(ttl_secs))
    }
}

// ── StatsStore ───────────────────────────────────────────────────

#[async_trait]
impl StatsStore for StorageBackend {
    async fn get_stats(&self) -> Result<StorageStats, StorageError> {
        dispatch!(self, StatsStore, get_stats())
    }
}
