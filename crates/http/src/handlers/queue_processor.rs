use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use feedrelay_core::{env_parse_with_default, Task};
use feedrelay_service::{default_visibility_timeout_secs, QueuedTask};

use crate::AppState;

/// Background loop period; also the granularity of the periodic chores below.
const PROCESSOR_TICK: Duration = Duration::from_secs(5);

/// Processor ticks per day (17280 * 5s = 86400s).
const TICKS_PER_DAY: u64 = 17_280;

pub(crate) fn max_queue_workers() -> usize {
    env_parse_with_default("FEEDRELAY_QUEUE_WORKERS", 4)
}

fn dlq_ttl_secs() -> i64 {
    env_parse_with_default("FEEDRELAY_DLQ_TTL_DAYS", 7_i64).saturating_mul(86_400)
}

async fn process_task(state: &AppState, queued: &QueuedTask) {
    match state.dispatcher.process(queued).await {
        Ok(true) => tracing::info!(task_id = queued.id, kind = %queued.task.kind(), "task done"),
        Ok(false) => {},
        Err(e) => {
            // The task stays claimed and is picked up again after the visibility timeout.
            tracing::error!(task_id = queued.id, error = %e, "Background: settling task failed");
        },
    }
}

/// Spawns background task that polls the task queue every 5 seconds.
pub fn start_background_processor(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PROCESSOR_TICK);
        let mut loop_count: u64 = 0;
        loop {
            interval.tick().await;
            if !state.processing_active.load(Ordering::SeqCst) {
                continue;
            }

            // Periodic DLQ garbage collection (~once per day)
            loop_count = loop_count.wrapping_add(1);
            if loop_count.is_multiple_of(TICKS_PER_DAY) {
                match state.queue_service.clear_stale_failed_tasks(dlq_ttl_secs()).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Periodic DLQ garbage collection completed");
                    },
                    Ok(_) => {},
                    Err(e) => {
                        tracing::warn!(error = %e, "Periodic DLQ garbage collection failed");
                    },
                }
            }

            tracing::debug!("Background processor: checking queue...");

            let available_permits = state.semaphore.available_permits().min(max_queue_workers());
            if available_permits == 0 {
                continue;
            }

            let tasks = match state
                .queue_service
                .claim_tasks(available_permits, default_visibility_timeout_secs())
                .await
            {
                Ok(tasks) => tasks,
                Err(e) => {
                    tracing::error!("Background processor: claim failed: {}", e);
                    continue;
                },
            };

            if tasks.is_empty() {
                continue;
            }

            let count = tasks.len();
            for queued in tasks {
                let Ok(permit) = Arc::clone(&state.semaphore).acquire_owned().await else {
                    continue;
                };
                let state_clone = Arc::clone(&state);
                // Not joined, so one slow page never holds up the next tick.
                tokio::spawn(async move {
                    let _permit = permit;
                    process_task(&state_clone, &queued).await;
                });
            }

            tracing::info!("Background processor: spawned {} tasks", count);
        }
    });
}

/// Spawns the loop that queues a poll of the configured feed every `every`.
///
/// The first poll is queued immediately. Failures are logged and the loop carries on.
pub fn start_poll_scheduler(state: Arc<AppState>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !state.processing_active.load(Ordering::SeqCst) {
                tracing::debug!("Poll scheduler: processing paused, skipping poll");
                continue;
            }
            let task = Task::PollFeed { feed_url: state.feed_url.clone() };
            match state.queue_service.enqueue(&task).await {
                Ok(task_id) => tracing::debug!(task_id, feed_url = %state.feed_url, "poll queued"),
                Err(e) => tracing::error!(error = %e, "Poll scheduler: could not queue poll"),
            }
        }
    });
}

/// Releases tasks left claimed by a previous run back to pending.
///
/// # Errors
/// Returns error if database operation fails.
pub async fn run_startup_recovery(state: &AppState) -> anyhow::Result<usize> {
    // One instance per database: nothing is in flight yet, so every claim is stale.
    let released = state.queue_service.release_stale_tasks(0).await?;
    if released > 0 {
        tracing::info!("Startup recovery: released {} stale tasks back to pending", released);
    }
    Ok(released)
}
