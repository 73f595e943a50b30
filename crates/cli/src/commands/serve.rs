use std::sync::Arc;

use anyhow::Result;
use feedrelay_core::Config;
use feedrelay_http::{
    create_router, run_startup_recovery, start_background_processor, start_poll_scheduler,
    AppState,
};
use feedrelay_storage::StorageBackend;

pub(crate) async fn run(
    config: &Config,
    storage: Arc<StorageBackend>,
    host: &str,
    port: u16,
) -> Result<()> {
    let state = Arc::new(AppState::new(config, storage)?);

    if let Err(e) = run_startup_recovery(&state).await {
        tracing::warn!("Startup recovery failed: {}", e);
    }

    tracing::info!(
        feed_url = %config.feed_url,
        every_secs = config.poll_interval.as_secs(),
        "Starting poll scheduler"
    );
    start_poll_scheduler(Arc::clone(&state), config.poll_interval);
    start_background_processor(Arc::clone(&state));

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
