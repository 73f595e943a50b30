#![expect(clippy::unwrap_used, reason = "test code")]

use super::create_test_storage;
use crate::traits::{FeedEntryStore, PageLinkStore, StatsStore};
use feedrelay_core::{NewFeedEntry, NewPageLink};

fn entry(link: &str, title: &str) -> NewFeedEntry {
    NewFeedEntry { link: link.to_owned(), title: title.to_owned() }
}

#[tokio::test]
async fn insert_feed_entry_is_idempotent_on_link() {
    let storage = create_test_storage();

    assert!(storage.insert_feed_entry(&entry("https://a.example/1", "First")).await.unwrap());
    assert!(!storage.insert_feed_entry(&entry("https://a.example/1", "Renamed")).await.unwrap());

    let found = storage.find_feed_entry("https://a.example/1").await.unwrap().unwrap();
    assert_eq!(found.title, "First");
    assert_eq!(storage.get_stats().await.unwrap().feed_entries, 1);
}

#[tokio::test]
async fn find_feed_entry_missing_returns_none() {
    let storage = create_test_storage();
    assert!(storage.find_feed_entry("https://nowhere.example").await.unwrap().is_none());
}

#[tokio::test]
async fn recent_feed_entries_newest_first() {
    let storage = create_test_storage();
    for i in 0..5 {
        storage.insert_feed_entry(&entry(&format!("https://a.example/{i}"), "t")).await.unwrap();
    }

    let recent = storage.recent_feed_entries(3).await.unwrap();
    let links: Vec<&str> = recent.iter().map(|e| e.link.as_str()).collect();
    assert_eq!(links, ["https://a.example/4", "https://a.example/3", "https://a.example/2"]);
}

#[tokio::test]
async fn page_links_keep_insertion_order_and_duplicates() {
    let storage = create_test_storage();
    let hrefs = vec![
        "https://dl.example/b".to_owned(),
        "https://dl.example/a".to_owned(),
        "https://dl.example/b".to_owned(),
    ];
    let rows = NewPageLink::for_entry("https://a.example/1", "Album", &hrefs);

    assert_eq!(storage.insert_page_links(&rows).await.unwrap(), 3);

    let stored = storage.page_links_for("https://a.example/1").await.unwrap();
    let pages: Vec<&str> = stored.iter().map(|l| l.page_link.as_str()).collect();
    assert_eq!(pages, ["https://dl.example/b", "https://dl.example/a", "https://dl.example/b"]);
    assert!(stored.iter().all(|l| l.feed_title == "Album"));
    assert!(storage.page_links_for("https://a.example/other").await.unwrap().is_empty());
    assert_eq!(storage.get_stats().await.unwrap().page_links, 3);
}

#[tokio::test]
async fn insert_no_page_links_writes_nothing() {
    let storage = create_test_storage();
    assert_eq!(storage.insert_page_links(&[]).await.unwrap(), 0);
    assert_eq!(storage.get_stats().await.unwrap().page_links, 0);
}
