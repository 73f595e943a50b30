//! Storage trait abstraction
//!
//! Async domain traits implemented by the PostgreSQL backend, the in-memory
//! backend, and the dispatching `StorageBackend` enum.

pub mod feed;
pub mod queue;
pub mod stats;

pub use feed::{FeedEntryStore, PageLinkStore};
pub use queue::TaskQueueStore;
pub use stats::StatsStore;
