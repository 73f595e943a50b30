//! TaskQueueStore implementation for PgStorage.

use super::*;

use crate::task_queue::{max_retry_count, QueueStats};
use crate::traits::TaskQueueStore;
use async_trait::async_trait;

#[async_trait]
impl TaskQueueStore for PgStorage {
    async fn enqueue_task(&self, task: &Task) -> Result<i64, StorageError> {
        let now = Utc::now().timestamp();
        let payload = serde_json::to_value(task)?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO tasks (kind, payload, status, retry_count, created_at_epoch,
                                available_at_epoch)
               VALUES ($1, $2, 'pending', 0, $3, $3)
               RETURNING id",
        )
        .bind(task.kind().as_str())
        .bind(payload)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn claim_tasks(
        &self,
        limit: usize,
        visibility_timeout_secs: i64,
    ) -> Result<Vec<QueuedTask>, StorageError> {
        let now = Utc::now().timestamp();
        let stale_threshold = now - visibility_timeout_secs;
        let rows = sqlx::query(&format!(
            "UPDATE tasks
               SET status = 'processing', claimed_at_epoch = $1
               WHERE id IN (
                   SELECT id FROM tasks
                   WHERE (status = 'pending' AND available_at_epoch <= $1)
                      OR (status = 'processing' AND claimed_at_epoch < $2)
                   ORDER BY created_at_epoch ASC, id ASC
                   LIMIT $3
                   FOR UPDATE SKIP LOCKED
               )
               RETURNING {TASK_COLUMNS}"
        ))
        .bind(now)
        .bind(stale_threshold)
        .bind(usize_to_i64(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut claimed = Vec::with_capacity(rows.len());
        let mut corrupt = Vec::new();
        for row in &rows {
            match row_to_queued_task(row) {
                Ok(task) => claimed.push(task),
                Err(e) => {
                    let id: i64 = row.try_get("id")?;
                    tracing::warn!(task_id = id, error = %e, "unreadable task payload, dead-lettering");
                    corrupt.push(id);
                },
            }
        }
        if !corrupt.is_empty() {
            sqlx::query(
                "UPDATE tasks SET status = 'failed', last_error = 'unreadable payload'
                   WHERE id = ANY($1)",
            )
            .bind(corrupt.as_slice())
            .execute(&self.pool)
            .await?;
        }
        claimed.sort_by_key(|t| (t.created_at_epoch, t.id));
        Ok(claimed)
    }

    async fn complete_task(&self, id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM tasks WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn fail_task(
        &self,
        id: i64,
        error: &str,
        retry_after_secs: Option<i64>,
    ) -> Result<(), StorageError> {
        if let Some(delay) = retry_after_secs {
            let available_at = Utc::now().timestamp().saturating_add(delay.max(0));
            sqlx::query(
                "UPDATE tasks
                   SET retry_count = retry_count + 1,
                       status = CASE
                           WHEN retry_count + 1 >= $1 THEN 'failed'
                           ELSE 'pending'
                       END,
                       last_error = $2,
                       claimed_at_epoch = NULL,
                       available_at_epoch = $3
                   WHERE id = $4",
            )
            .bind(max_retry_count())
            .bind(error)
            .bind(available_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                "UPDATE tasks
                   SET status = 'failed', retry_count = retry_count + 1, last_error = $1
                   WHERE id = $2",
            )
            .bind(error)
            .bind(id)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn release_stale_tasks(
        &self,
        visibility_timeout_secs: i64,
    ) -> Result<usize, StorageError> {
        let now = Utc::now().timestamp();
        let stale_threshold = now - visibility_timeout_secs;
        let result = sqlx::query(
            "UPDATE tasks
               SET status = 'pending', claimed_at_epoch = NULL
               WHERE status = 'processing' AND claimed_at_epoch <= $1",
        )
        .bind(stale_threshold)
        .execute(&self.pool)
        .await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn get_failed_tasks(&self, limit: usize) -> Result<Vec<QueuedTask>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
               WHERE status = 'failed'
               ORDER BY created_at_epoch DESC, id DESC
               LIMIT $1"
        ))
        .bind(usize_to_i64(limit))
        .fetch_all(&self.pool)
        .await?;
        // Dead-lettered rows may be the unreadable ones; list what can be read.
        Ok(rows
            .iter()
            .filter_map(|row| {
                row_to_queued_task(row)
                    .inspect_err(|e| tracing::debug!(error = %e, "skipping unreadable failed task"))
                    .ok()
            })
            .collect())
    }

    async fn get_queue_stats(&self) -> Result<QueueStats, StorageError> {
        let row = sqlx::query(
            "SELECT
               COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) as pending,
               COALESCE(SUM(CASE WHEN status = 'processing' THEN 1 ELSE 0 END), 0) as processing,
               COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0) as failed
             FROM tasks",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(QueueStats {
            pending: u64::try_from(row.try_get::<i64, _>("pending")?).unwrap_or(0),
            processing: u64::try_from(row.try_get::<i64, _>("processing")?).unwrap_or(0),
            failed: u64::try_from(row.try_get::<i64, _>("failed")?).unwrap_or(0),
        })
    }

    async fn retry_failed_tasks(&self) -> Result<usize, StorageError> {
        let result = sqlx::query(
            "UPDATE tasks
               SET status = 'pending', retry_count = 0, claimed_at_epoch = NULL,
                   available_at_epoch = 0
               WHERE status = 'failed'",
        )
        .execute(&self.pool)
        .await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn clear_failed_tasks(&self) -> Result<usize, StorageError> {
        let result =
            sqlx::query("DELETE FROM tasks WHERE status = 'failed'").execute(&self.pool).await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn clear_stale_failed_tasks(&self, ttl_secs: i64) -> Result<usize, StorageError> {
        let threshold = Utc::now().timestamp() - ttl_secs;
        let result =
            sqlx::query("DELETE FROM tasks WHERE status = 'failed' AND created_at_epoch < $1")
                .bind(threshold)
                .execute(&self.pool)
                .await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }
}
