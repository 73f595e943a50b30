//! PostgreSQL storage backend using sqlx.
//!
//! Split into modular files by domain concern.

// Arithmetic in DB operations (epochs, counting) is bounded by DB limits
#![allow(
    clippy::arithmetic_side_effects,
    reason = "DB row counts and epoch offsets are bounded by PostgreSQL limits"
)]

mod feed_entries;
mod page_links;
mod stats;
mod tasks;

use std::time::Duration;

use chrono::{DateTime, Utc};
use feedrelay_core::{
    FeedEntry, PageLink, PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS,
    PG_POOL_MAX_CONNECTIONS, Task,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::error::StorageError;
use crate::task_queue::{QueuedTask, TaskStatus};

use super::pg_migrations::run_pg_migrations;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connects a pool to `database_url` and applies migrations.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        run_pg_migrations(&pool).await.map_err(|e| StorageError::Migration(e.to_string()))?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }

    /// Wraps an existing pool. Migrations are not run.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Convert `usize` to `i64` for SQL LIMIT binds.
/// Saturates to `i64::MAX` on overflow (only possible on 128-bit targets).
pub(crate) fn usize_to_i64(val: usize) -> i64 {
    i64::try_from(val).unwrap_or(i64::MAX)
}

pub(crate) fn row_to_feed_entry(row: &sqlx::postgres::PgRow) -> Result<FeedEntry, StorageError> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(FeedEntry {
        id: row.try_get("id")?,
        link: row.try_get("link")?,
        title: row.try_get("title")?,
        created_at,
        updated_at,
    })
}

pub(crate) fn row_to_page_link(row: &sqlx::postgres::PgRow) -> Result<PageLink, StorageError> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(PageLink {
        id: row.try_get("id")?,
        feed_link: row.try_get("feed_link")?,
        feed_title: row.try_get("feed_title")?,
        page_link: row.try_get("page_link")?,
        created_at,
        updated_at,
    })
}

pub(crate) fn row_to_queued_task(row: &sqlx::postgres::PgRow) -> Result<QueuedTask, StorageError> {
    let status_str: String = row.try_get("status")?;
    let status = status_str.parse::<TaskStatus>().unwrap_or_else(|_| {
        tracing::warn!(invalid_status = %status_str, "corrupt task status in DB, defaulting to Pending");
        TaskStatus::Pending
    });
    let payload: serde_json::Value = row.try_get("payload")?;
    let task: Task = serde_json::from_value(payload)?;
    Ok(QueuedTask {
        id: row.try_get("id")?,
        task,
        status,
        retry_count: row.try_get("retry_count")?,
        last_error: row.try_get("last_error")?,
        created_at_epoch: row.try_get("created_at_epoch")?,
        claimed_at_epoch: row.try_get("claimed_at_epoch")?,
        available_at_epoch: row.try_get("available_at_epoch")?,
    })
}

pub(crate) const FEED_ENTRY_COLUMNS: &str = "id, link, title, created_at, updated_at";

pub(crate) const PAGE_LINK_COLUMNS: &str =
    "id, feed_link, feed_title, page_link, created_at, updated_at";

pub(crate) const TASK_COLUMNS: &str =
    "id, payload, status, retry_count, last_error, created_at_epoch, claimed_at_epoch, \
     available_at_epoch";
