//! HTTP admin API and background workers for feedrelay.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod api_types;
mod handlers;
#[cfg(test)]
mod tests;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;

use feedrelay_core::Config;
use feedrelay_service::{CatalogService, QueueService, ServiceError, TaskDispatcher};
use feedrelay_storage::StorageBackend;

pub use api_types::VersionResponse;
pub use handlers::queue_processor::{
    run_startup_recovery, start_background_processor, start_poll_scheduler,
};

/// Shared application state for all HTTP handlers and background loops.
///
/// Wrapped in `Arc` for thread-safe sharing across handlers.
pub struct AppState {
    /// Semaphore limiting concurrent task processing
    pub semaphore: Arc<Semaphore>,
    /// Flag indicating if queue processing is active
    pub processing_active: AtomicBool,
    /// Feed the scheduler and `/api/poll` enqueue polls for
    pub feed_url: String,
    /// Which storage backend is in use, for `/api/stats`
    pub storage_kind: &'static str,
    /// Runs claimed tasks through the pipeline
    pub dispatcher: Arc<TaskDispatcher>,
    /// Service for task queue operations
    pub queue_service: Arc<QueueService>,
    /// Service for stored entries and links
    pub catalog_service: Arc<CatalogService>,
}

impl AppState {
    pub fn new(config: &Config, storage: Arc<StorageBackend>) -> Result<Self, ServiceError> {
        let dispatcher = TaskDispatcher::from_config(config, Arc::clone(&storage))?;
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(handlers::queue_processor::max_queue_workers())),
            processing_active: AtomicBool::new(true),
            feed_url: config.feed_url.clone(),
            storage_kind: storage.kind(),
            dispatcher: Arc::new(dispatcher),
            queue_service: Arc::new(QueueService::new(Arc::clone(&storage))),
            catalog_service: Arc::new(CatalogService::new(storage)),
        })
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/stats", get(handlers::entries::get_stats))
        .route("/api/entries", get(handlers::entries::get_recent_entries))
        .route("/api/entries/links", get(handlers::entries::get_entry_links))
        .route("/api/queue", get(handlers::queue::get_queue))
        .route("/api/queue/retry-failed", post(handlers::queue::retry_failed_queue))
        .route("/api/queue/failed", delete(handlers::queue::clear_failed_queue))
        .route("/api/poll", post(handlers::queue::trigger_poll))
        .route(
            "/api/processing",
            get(handlers::queue::get_processing_status).post(handlers::queue::set_processing_status),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
