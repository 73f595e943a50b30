use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use feedrelay_core::Task;

use crate::api_error::ApiError;
use crate::api_types::{
    ClearQueueResponse, LimitQuery, PollResponse, ProcessingStatusResponse, QueueResponse,
    RetryQueueResponse, SetProcessingRequest, SetProcessingResponse,
};
use crate::AppState;

pub async fn get_queue(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<QueueResponse>, ApiError> {
    let failed = state.queue_service.get_failed_tasks(query.capped_limit()).await?;
    let stats = state.queue_service.get_queue_stats().await?;
    Ok(Json(QueueResponse { stats, failed }))
}

pub async fn retry_failed_queue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RetryQueueResponse>, ApiError> {
    let retried = state.queue_service.retry_failed_tasks().await?;
    tracing::info!(retried, "failed tasks requeued");
    Ok(Json(RetryQueueResponse { retried }))
}

pub async fn clear_failed_queue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearQueueResponse>, ApiError> {
    let cleared = state.queue_service.clear_failed_tasks().await?;
    Ok(Json(ClearQueueResponse { cleared }))
}

/// Queue an immediate poll of the configured feed.
pub async fn trigger_poll(State(state): State<Arc<AppState>>) -> Result<Json<PollResponse>, ApiError> {
    let task_id =
        state.queue_service.enqueue(&Task::PollFeed { feed_url: state.feed_url.clone() }).await?;
    tracing::info!(task_id, "poll requested");
    Ok(Json(PollResponse { task_id, feed_url: state.feed_url.clone() }))
}

pub async fn get_processing_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProcessingStatusResponse>, ApiError> {
    let active = state.processing_active.load(Ordering::SeqCst);
    let pending = state.queue_service.get_queue_stats().await?.pending;
    Ok(Json(ProcessingStatusResponse { active, pending }))
}

pub async fn set_processing_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetProcessingRequest>,
) -> Json<SetProcessingResponse> {
    state.processing_active.store(req.active, Ordering::SeqCst);
    tracing::info!(active = req.active, "queue processing toggled");
    Json(SetProcessingResponse { active: req.active })
}
