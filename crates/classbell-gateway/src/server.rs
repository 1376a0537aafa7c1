//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use classbell_core::error::ClassbellError;
use classbell_core::Result;
use classbell_functions::Deliverer;
use classbell_store::DocumentStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the trigger gateway.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub deliverer: Deliverer,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(super::routes::health_check))
        .route(
            "/triggers/classes/{class_id}",
            post(super::routes::class_updated),
        )
        .route(
            "/triggers/classes/{class_id}/tasks/{task_id}",
            post(super::routes::task_created),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(Arc::new(state))
}

/// Bind and serve until the process ends.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ClassbellError::Gateway(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("Trigger gateway listening on {addr}");
    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| ClassbellError::Gateway(format!("Server error: {e}")))?;
    Ok(())
}
