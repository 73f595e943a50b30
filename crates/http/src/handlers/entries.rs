use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use feedrelay_core::{FeedEntry, PageLink};

use crate::api_error::ApiError;
use crate::api_types::{LimitQuery, LinksQuery, StatsResponse};
use crate::AppState;

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let entries = state.catalog_service.stats().await?;
    let queue = state.queue_service.get_queue_stats().await?;
    Ok(Json(StatsResponse { storage: state.storage_kind, entries, queue }))
}

pub async fn get_recent_entries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    Ok(Json(state.catalog_service.recent_entries(query.capped_limit()).await?))
}

pub async fn get_entry_links(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LinksQuery>,
) -> Result<Json<Vec<PageLink>>, ApiError> {
    Ok(Json(state.catalog_service.links_for(&query.link).await?))
}
