//! Service layer for feedrelay
//!
//! The pipeline steps (poll, scrape, notify), the dispatcher that runs them from
//! the task queue, and thin read/admin wrappers over storage.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]

mod catalog_service;
mod dispatcher;
mod error;
mod feed_service;
mod notify_service;
mod queue_service;
mod scrape_service;

pub use catalog_service::CatalogService;
pub use dispatcher::{DrainReport, TaskDispatcher};
pub use error::ServiceError;
pub use feed_service::{FeedService, PollReport};
pub use notify_service::NotifyService;
pub use queue_service::QueueService;
pub use scrape_service::ScrapeService;

pub use feedrelay_storage::{
    QueueStats, QueuedTask, StorageStats, TaskStatus, default_visibility_timeout_secs,
    max_retry_count,
};
