#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use feedrelay_core::{Config, NewFeedEntry, NewPageLink, Task};
use feedrelay_service::ServiceError;
use feedrelay_storage::traits::{FeedEntryStore, PageLinkStore, TaskQueueStore};
use feedrelay_storage::{StorageBackend, StorageError};
use tower::ServiceExt;

use crate::api_error::ApiError;
use crate::{
    create_router, run_startup_recovery, start_background_processor, start_poll_scheduler,
    AppState,
};

fn test_state() -> (Arc<StorageBackend>, Arc<AppState>) {
    state_for_feed("https://feed.test/rss")
}

fn state_for_feed(feed_url: &str) -> (Arc<StorageBackend>, Arc<AppState>) {
    let config =
        Config::from_lookup(|key| (key == "FEEDRELAY_FEED_URL").then(|| feed_url.to_owned()))
            .unwrap();
    let storage = Arc::new(StorageBackend::new_memory());
    let state = AppState::new(&config, Arc::clone(&storage)).unwrap();
    (storage, Arc::new(state))
}

async fn send(state: &Arc<AppState>, method: &str, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = create_router(Arc::clone(state)).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn get_json(state: &Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(state, "GET", uri, Body::empty()).await;
    (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
}

#[tokio::test]
async fn health_and_version() {
    let (_storage, state) = test_state();

    let (status, body) = send(&state, "GET", "/health", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");

    let (status, json) = get_json(&state, "/api/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn stats_report_storage_and_queue() {
    let (storage, state) = test_state();
    let entry = NewFeedEntry { link: "https://m.test/1".to_owned(), title: "One".to_owned() };
    storage.insert_feed_entry(&entry).await.unwrap();

    let (status, json) = get_json(&state, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["storage"], "memory");
    assert_eq!(json["entries"]["feed_entries"], 1);
    assert_eq!(json["queue"]["pending"], 0);
}

#[tokio::test]
async fn entries_and_links_are_listed() {
    let (storage, state) = test_state();
    for i in 0..3 {
        let entry = NewFeedEntry { link: format!("https://m.test/{i}"), title: format!("T{i}") };
        storage.insert_feed_entry(&entry).await.unwrap();
    }
    let links = NewPageLink::for_entry("https://m.test/1", "T1", &["https://dl.test/a".to_owned()]);
    storage.insert_page_links(&links).await.unwrap();

    let (status, json) = get_json(&state, "/api/entries?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> =
        json.as_array().unwrap().iter().map(|e| e["link"].as_str().unwrap()).collect();
    assert_eq!(listed, ["https://m.test/2", "https://m.test/1"]);

    let (status, json) = get_json(&state, "/api/entries/links?link=https%3A%2F%2Fm.test%2F1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["page_link"], "https://dl.test/a");
    assert_eq!(json[0]["feed_title"], "T1");
}

#[tokio::test]
async fn empty_link_is_bad_request() {
    let (_storage, state) = test_state();

    let (status, json) = get_json(&state, "/api/entries/links?link=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "feed link is empty");
}

#[tokio::test]
async fn poll_endpoint_queues_a_poll_of_the_configured_feed() {
    let (storage, state) = test_state();

    let (status, body) = send(&state, "POST", "/api/poll", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["feed_url"], "https://feed.test/rss");

    let claimed = storage.claim_tasks(10, 300).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].task, Task::PollFeed { feed_url: "https://feed.test/rss".to_owned() });
}

#[tokio::test]
async fn failed_tasks_can_be_listed_retried_and_cleared() {
    let (storage, state) = test_state();
    let id = storage.enqueue_task(&Task::SendNotification { message: "m".to_owned() }).await.unwrap();
    storage.claim_tasks(1, 300).await.unwrap();
    storage.fail_task(id, "Telegram API error 400: bad", None).await.unwrap();

    let (status, json) = get_json(&state, "/api/queue").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stats"]["failed"], 1);
    assert_eq!(json["failed"][0]["last_error"], "Telegram API error 400: bad");
    assert_eq!(json["failed"][0]["task"]["kind"], "send_notification");

    let (status, body) = send(&state, "POST", "/api/queue/retry-failed", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<serde_json::Value>(&body).unwrap()["retried"], 1);

    storage.claim_tasks(1, 300).await.unwrap();
    storage.fail_task(id, "again", None).await.unwrap();
    let (status, body) = send(&state, "DELETE", "/api/queue/failed", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<serde_json::Value>(&body).unwrap()["cleared"], 1);
}

#[tokio::test]
async fn processing_can_be_paused() {
    let (_storage, state) = test_state();

    let (status, _) =
        send(&state, "POST", "/api/processing", Body::from(r#"{"active": false}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!state.processing_active.load(Ordering::SeqCst));

    let (status, json) = get_json(&state, "/api/processing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active"], false);
    assert_eq!(json["pending"], 0);
}

#[tokio::test]
async fn startup_recovery_releases_claimed_tasks() {
    let (storage, state) = test_state();
    storage.enqueue_task(&Task::PollFeed { feed_url: "u".to_owned() }).await.unwrap();
    storage.claim_tasks(1, 300).await.unwrap();

    assert_eq!(run_startup_recovery(&state).await.unwrap(), 1);
    assert_eq!(storage.claim_tasks(1, 300).await.unwrap().len(), 1);
}

#[test]
fn service_errors_map_to_status_codes() {
    let status = |err: ServiceError| ApiError::from(err).into_response().status();

    assert_eq!(status(ServiceError::InvalidInput("x".to_owned())), StatusCode::BAD_REQUEST);
    assert_eq!(
        status(ServiceError::NotConfigured("telegram".to_owned())),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        status(ServiceError::Storage(StorageError::Migration("boom".to_owned()))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test(start_paused = true)]
async fn scheduler_queues_a_poll_every_interval() {
    let (storage, state) = test_state();

    start_poll_scheduler(Arc::clone(&state), Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(130)).await;

    let queued = storage.claim_tasks(10, 300).await.unwrap();
    assert_eq!(queued.len(), 3);
    assert!(queued.iter().all(|t| t.task == Task::PollFeed {
        feed_url: "https://feed.test/rss".to_owned()
    }));
}

#[tokio::test(start_paused = true)]
async fn failing_polls_are_dead_lettered_and_scheduling_continues() {
    // Fails before any request is sent, and is not worth retrying.
    let (storage, state) = state_for_feed("not a feed url");

    start_poll_scheduler(Arc::clone(&state), Duration::from_secs(60));
    start_background_processor(Arc::clone(&state));
    tokio::time::sleep(Duration::from_secs(130)).await;

    let stats = storage.get_queue_stats().await.unwrap();
    assert_eq!((stats.pending, stats.processing, stats.failed), (0, 0, 3));
    let failed = storage.get_failed_tasks(10).await.unwrap();
    assert!(failed.iter().all(|t| t.last_error.as_deref().unwrap().contains("not a feed url")));
}

#[tokio::test(start_paused = true)]
async fn paused_processing_skips_polls_and_claims() {
    let (storage, state) = test_state();
    state.processing_active.store(false, Ordering::SeqCst);
    storage.enqueue_task(&Task::SendNotification { message: "hi".to_owned() }).await.unwrap();

    start_poll_scheduler(Arc::clone(&state), Duration::from_secs(60));
    start_background_processor(Arc::clone(&state));
    tokio::time::sleep(Duration::from_secs(130)).await;

    let stats = storage.get_queue_stats().await.unwrap();
    assert_eq!((stats.pending, stats.processing), (1, 0));
}
