//! In-process storage backend.
//!
//! Keeps everything in a mutex-guarded state. Used by `--ephemeral` runs and by
//! tests that exercise the pipeline without PostgreSQL. Follows the same queue
//! semantics as the PostgreSQL backend.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use feedrelay_core::{FeedEntry, NewFeedEntry, NewPageLink, PageLink, Task};

use crate::error::StorageError;
use crate::task_queue::{max_retry_count, QueueStats, QueuedTask, StorageStats, TaskStatus};
use crate::traits::{FeedEntryStore, PageLinkStore, StatsStore, TaskQueueStore};

#[derive(Debug, Default)]
struct State {
    feed_entries: Vec<FeedEntry>,
    page_links: Vec<PageLink>,
    tasks: BTreeMap<i64, QueuedTask>,
    last_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id = self.last_id.saturating_add(1);
        self.last_id
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<State>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

#[async_trait]
impl FeedEntryStore for MemoryStorage {
    async fn find_feed_entry(&self, link: &str) -> Result<Option<FeedEntry>, StorageError> {
        Ok(self.lock().feed_entries.iter().find(|e| e.link == link).cloned())
    }

    async fn insert_feed_entry(&self, entry: &NewFeedEntry) -> Result<bool, StorageError> {
        let mut state = self.lock();
        if state.feed_entries.iter().any(|e| e.link == entry.link) {
            return Ok(false);
        }
        let now = Utc::now();
        let id = state.next_id();
        state.feed_entries.push(FeedEntry {
            id,
            link: entry.link.clone(),
            title: entry.title.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(true)
    }

    async fn recent_feed_entries(&self, limit: usize) -> Result<Vec<FeedEntry>, StorageError> {
        Ok(self.lock().feed_entries.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait]
impl PageLinkStore for MemoryStorage {
    async fn insert_page_links(&self, links: &[NewPageLink]) -> Result<usize, StorageError> {
        let mut state = self.lock();
        let now = Utc::now();
        for link in links {
            let id = state.next_id();
            state.page_links.push(PageLink {
                id,
                feed_link: link.feed_link.clone(),
                feed_title: link.feed_title.clone(),
                page_link: link.page_link.clone(),
                created_at: now,
                updated_at: now,
            });
        }
        Ok(links.len())
    }

    async fn page_links_for(&self, feed_link: &str) -> Result<Vec<PageLink>, StorageError> {
        Ok(self.lock().page_links.iter().filter(|l| l.feed_link == feed_link).cloned().collect())
    }
}

#[async_trait]
impl TaskQueueStore for MemoryStorage {
    async fn enqueue_task(&self, task: &Task) -> Result<i64, StorageError> {
        let now = Utc::now().timestamp();
        let mut state = self.lock();
        let id = state.next_id();
        state.tasks.insert(
            id,
            QueuedTask {
                id,
                task: task.clone(),
                status: TaskStatus::Pending,
                retry_count: 0,
                last_error: None,
                created_at_epoch: now,
                claimed_at_epoch: None,
                available_at_epoch: now,
            },
        );
        Ok(id)
    }

    async fn claim_tasks(
        &self,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<QueuedTask>, StorageError> {
        let now = Utc::now().timestamp();
        let stale_threshold = now.saturating_sub(visibility_timeout_secs);
        let mut state = self.lock();

        let mut claimable: Vec<(i64, i64)> = state
            .tasks
            .values()
            .filter(|t| match t.status {
                TaskStatus::Pending => t.available_at_epoch <= now,
                TaskStatus::Processing => t.claimed_at_epoch.is_some_and(|c| c < stale_threshold),
                TaskStatus::Failed => false,
            })
            .map(|t| (t.created_at_epoch, t.id))
            .collect();
        claimable.sort_unstable();

        let mut claimed = Vec::new();
        for (_, id) in claimable.into_iter().take(limit) {
            if let Some(task) = state.tasks.get_mut(&id) {
                task.status = TaskStatus::Processing;
                task.claimed_at_epoch = Some(now);
                claimed.push(task.clone());
            }
        }
        Ok(claimed)
    }

    async fn complete_task(&self, id: i64) -> Result<(), StorageError> {
        self.lock().tasks.remove(&id);
        Ok(())
    }

    async fn fail_task(
        &self,
        id: i64,
        error: &str,
        retry_after_secs: Option<i64>,
    ) -> Result<(), StorageError> {
        let max_retry = max_retry_count();
        let now = Utc::now().timestamp();
        let mut state = self.lock();
        let Some(task) = state.tasks.get_mut(&id) else {
            return Ok(());
        };
        task.retry_count = task.retry_count.saturating_add(1);
        task.last_error = Some(error.to_owned());
        match retry_after_secs {
            Some(delay) if task.retry_count < max_retry => {
                task.status = TaskStatus::Pending;
                task.claimed_at_epoch = None;
                task.available_at_epoch = now.saturating_add(delay.max(0));
            },
            Some(_) => {
                task.status = TaskStatus::Failed;
                task.claimed_at_epoch = None;
            },
            None => task.status = TaskStatus::Failed,
        }
        Ok(())
    }

    async fn release_stale_tasks(
        &self,
        visibility_timeout_secs: i64,
    ) -> Result<usize, StorageError> {
        let stale_threshold = Utc::now().timestamp().saturating_sub(visibility_timeout_secs);
        let mut released = 0usize;
        for task in self.lock().tasks.values_mut() {
            if task.status == TaskStatus::Processing
                && task.claimed_at_epoch.is_some_and(|c| c <= stale_threshold)
            {
                task.status = TaskStatus::Pending;
                task.claimed_at_epoch = None;
                released = released.saturating_add(1);
            }
        }
        Ok(released)
    }

    async fn get_failed_tasks(&self, limit: usize) -> Result<Vec<QueuedTask>, StorageError> {
        Ok(self
            .lock()
            .tasks
            .values()
            .rev()
            .filter(|t| t.status == TaskStatus::Failed)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_queue_stats(&self) -> Result<QueueStats, StorageError> {
        let state = self.lock();
        let with_status = |s: TaskStatus| count(state.tasks.values().filter(|t| t.status == s).count());
        Ok(QueueStats {
            pending: with_status(TaskStatus::Pending),
            processing: with_status(TaskStatus::Processing),
            failed: with_status(TaskStatus::Failed),
        })
    }

    async fn retry_failed_tasks(&self) -> Result<usize, StorageError> {
        let mut retried = 0usize;
        for task in self.lock().tasks.values_mut().filter(|t| t.status == TaskStatus::Failed) {
            task.status = TaskStatus::Pending;
            task.retry_count = 0;
            task.claimed_at_epoch = None;
            task.available_at_epoch = 0;
            retried = retried.saturating_add(1);
        }
        Ok(retried)
    }

    async fn clear_failed_tasks(&self) -> Result<usize, StorageError> {
        let mut state = self.lock();
        let before = state.tasks.len();
        state.tasks.retain(|_, t| t.status != TaskStatus::Failed);
        Ok(before.saturating_sub(state.tasks.len()))
    }

    async fn clear_stale_failed_tasks(&self, ttl_secs: i64) -> Result<usize, StorageError> {
        let threshold = Utc::now().timestamp().saturating_sub(ttl_secs);
        let mut state = self.lock();
        let before = state.tasks.len();
        state
            .tasks
            .retain(|_, t| !(t.status == TaskStatus::Failed && t.created_at_epoch < threshold));
        Ok(before.saturating_sub(state.tasks.len()))
    }
}

#[async_trait]
impl StatsStore for MemoryStorage {
    async fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let state = self.lock();
        Ok(StorageStats {
            feed_entries: count(state.feed_entries.len()),
            page_links: count(state.page_links.len()),
        })
    }
}
