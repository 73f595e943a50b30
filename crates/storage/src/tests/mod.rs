//! Test utilities and module declarations for storage tests.

use crate::MemoryStorage;
use feedrelay_core::Task;

pub fn create_test_storage() -> MemoryStorage {
    MemoryStorage::new()
}

pub fn poll_task(feed_url: &str) -> Task {
    Task::PollFeed { feed_url: feed_url.to_owned() }
}

pub fn scrape_task(feed_link: &str) -> Task {
    Task::ScrapePage { feed_link: feed_link.to_owned(), feed_title: format!("Title of {feed_link}") }
}

mod feed_tests;
