use std::sync::Arc;

use anyhow::Result;
use feedrelay_service::{CatalogService, QueueService};
use feedrelay_storage::StorageBackend;

pub(crate) async fn run_stats(storage: Arc<StorageBackend>) -> Result<()> {
    let stats = CatalogService::new(Arc::clone(&storage)).stats().await?;
    let queue = QueueService::new(storage).get_queue_stats().await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "storage": stats, "queue": queue }))?
    );
    Ok(())
}

pub(crate) async fn run_recent(storage: Arc<StorageBackend>, limit: usize) -> Result<()> {
    let entries = CatalogService::new(storage).recent_entries(limit).await?;
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

pub(crate) async fn run_links(storage: Arc<StorageBackend>, feed_link: &str) -> Result<()> {
    let links = CatalogService::new(storage).links_for(feed_link).await?;
    println!("{}", serde_json::to_string_pretty(&links)?);
    Ok(())
}

pub(crate) async fn run_retry_failed(storage: Arc<StorageBackend>) -> Result<()> {
    let retried = QueueService::new(storage).retry_failed_tasks().await?;
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "retried": retried }))?);
    Ok(())
}
