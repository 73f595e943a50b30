use std::sync::Arc;

use anyhow::Result;
use feedrelay_core::{Config, Task};
use feedrelay_notify::TelegramNotifier;
use feedrelay_service::{NotifyService, QueueService, TaskDispatcher};
use feedrelay_storage::StorageBackend;

/// Upper bound on tasks handled by one inline run. A feed yields at most a few
/// dozen entries, each fanning out to two tasks.
const MAX_INLINE_TASKS: usize = 10_000;

pub(crate) async fn run_poll(config: &Config, storage: Arc<StorageBackend>) -> Result<()> {
    let queue = QueueService::new(Arc::clone(&storage));
    let dispatcher = TaskDispatcher::from_config(config, storage)?;

    queue.enqueue(&Task::PollFeed { feed_url: config.feed_url.clone() }).await?;
    let report = dispatcher.drain(MAX_INLINE_TASKS).await?;
    if report.failed > 0 {
        tracing::warn!(failed = report.failed, "Some tasks did not complete");
    }
    let stats = queue.get_queue_stats().await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "drain": report, "queue": stats }))?
    );
    Ok(())
}

pub(crate) async fn run_notify(config: &Config, message: &str) -> Result<()> {
    let notifier = config
        .telegram
        .as_ref()
        .map(|telegram| TelegramNotifier::new(telegram, config.http_timeout))
        .transpose()?;
    NotifyService::new(notifier).send(message).await?;
    println!("Message sent");
    Ok(())
}
