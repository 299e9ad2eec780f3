//! HTTP server assembly and lifecycle

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::{AppState, BackgroundTasks, Config, TaskKind};
use crate::sweeper::PaymentSweeper;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    api::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API and run background tasks until shutdown.
pub async fn run(config: Config, state: AppState) -> anyhow::Result<()> {
    let mut tasks = BackgroundTasks::new();
    let sweeper = PaymentSweeper::new(
        Arc::clone(&state.engine),
        Duration::from_secs(config.sweep_interval_secs),
        tasks.shutdown_token(),
    );
    tasks.spawn("payment_sweeper", TaskKind::Periodic, sweeper.run());

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = %config.environment, "Baon server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tasks.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
