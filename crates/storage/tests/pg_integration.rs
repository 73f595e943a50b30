//! Integration tests for PgStorage.
//! Run with: DATABASE_URL=... cargo test -p feedrelay-storage -- --ignored pg_
//!
//! Each test works in its own freshly created schema and drops it at the end,
//! so rows already in the target database are never read or changed.

#![allow(clippy::unwrap_used, reason = "integration test code")]

use std::time::{SystemTime, UNIX_EPOCH};

use feedrelay_core::{NewFeedEntry, NewPageLink, Task};
use feedrelay_storage::traits::{FeedEntryStore, PageLinkStore, StatsStore, TaskQueueStore};
use feedrelay_storage::PgStorage;
use sqlx::PgPool;

struct ScratchSchema {
    admin: PgPool,
    name: String,
    storage: PgStorage,
}

impl ScratchSchema {
    async fn create() -> Self {
        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for PgStorage integration tests");
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let name = format!("feedrelay_test_{nanos}");

        let admin = PgPool::connect(&url).await.expect("Failed to connect to PostgreSQL");
        sqlx::query(&format!("CREATE SCHEMA {name}")).execute(&admin).await.unwrap();

        let sep = if url.contains('?') { '&' } else { '?' };
        let scoped = format!("{url}{sep}options=-c%20search_path%3D{name}");
        let storage = PgStorage::new(&scoped).await.expect("Failed to open scratch schema");
        Self { admin, name, storage }
    }

    async fn remove(self) {
        drop(self.storage);
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.name))
            .execute(&self.admin)
            .await
            .unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn pg_feed_entry_dedup_by_link() {
    let scratch = ScratchSchema::create().await;
    let storage = &scratch.storage;
    let link = "https://entry.test/1".to_owned();
    let entry = NewFeedEntry { link: link.clone(), title: "First".to_owned() };

    assert!(storage.insert_feed_entry(&entry).await.unwrap());
    assert!(!storage.insert_feed_entry(&entry).await.unwrap());

    let found = storage.find_feed_entry(&link).await.unwrap().unwrap();
    assert_eq!(found.title, "First");
    assert!(found.id > 0);

    scratch.remove().await;
}

#[tokio::test]
#[ignore]
async fn pg_page_links_roundtrip_in_order() {
    let scratch = ScratchSchema::create().await;
    let storage = &scratch.storage;
    let feed_link = "https://links.test/album";
    let hrefs = vec!["https://dl.test/2".to_owned(), "https://dl.test/1".to_owned()];

    let written = storage
        .insert_page_links(&NewPageLink::for_entry(feed_link, "Album", &hrefs))
        .await
        .unwrap();
    assert_eq!(written, 2);

    let stored = storage.page_links_for(feed_link).await.unwrap();
    let pages: Vec<&str> = stored.iter().map(|l| l.page_link.as_str()).collect();
    assert_eq!(pages, ["https://dl.test/2", "https://dl.test/1"]);

    assert_eq!(storage.get_stats().await.unwrap().page_links, 2);

    scratch.remove().await;
}

#[tokio::test]
#[ignore]
async fn pg_task_lifecycle() {
    let scratch = ScratchSchema::create().await;
    let storage = &scratch.storage;
    let task = Task::ScrapePage {
        feed_link: "https://task.test/1".to_owned(),
        feed_title: "T".to_owned(),
    };

    let id = storage.enqueue_task(&task).await.unwrap();
    let claimed = storage.claim_tasks(10, 300).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].id, id);
    assert_eq!(claimed[0].task, task);

    storage.fail_task(id, "rate limited", Some(60)).await.unwrap();
    assert!(storage.claim_tasks(10, 300).await.unwrap().is_empty());
    assert_eq!(storage.get_queue_stats().await.unwrap().pending, 1);

    scratch.remove().await;
}

#[tokio::test]
#[ignore]
async fn pg_permanent_failure_is_dead_lettered() {
    let scratch = ScratchSchema::create().await;
    let storage = &scratch.storage;
    let id = storage
        .enqueue_task(&Task::PollFeed { feed_url: "https://feed.test/rss".to_owned() })
        .await
        .unwrap();
    storage.claim_tasks(1, 300).await.unwrap();

    storage.fail_task(id, "permanent", None).await.unwrap();
    let failed = storage.get_failed_tasks(10).await.unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].last_error.as_deref(), Some("permanent"));

    assert_eq!(storage.clear_failed_tasks().await.unwrap(), 1);

    scratch.remove().await;
}
