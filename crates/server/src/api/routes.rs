use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{files, handlers, middleware::metrics_middleware, process, summary};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Persisted results
        .route("/files", get(files::list_files))
        .route("/summary", get(summary::get_summary))
        .route("/summaries", get(summary::list_summaries))
        // Pipeline runs
        .route("/process", post(process::start_processing))
        .route("/process/status", get(process::get_status))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
