//! Storage layer for feedrelay
//!
//! PostgreSQL-backed persistence for feed entries, scraped page links and the
//! durable task queue, plus an in-memory backend with the same semantics.

pub mod backend;
pub mod error;
mod memory;
mod pg_migrations;
mod pg_storage;
mod task_queue;
#[cfg(test)]
mod tests;
pub mod traits;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use pg_storage::PgStorage;
pub use task_queue::{
    QueueStats, QueuedTask, StorageStats, TaskStatus, default_visibility_timeout_secs,
    max_retry_count,
};
