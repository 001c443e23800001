//! Run summary API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use pressroom_core::{StoreError, StoredSummary};

use super::handlers::ErrorResponse;
use crate::state::AppState;

const MAX_HISTORY: i64 = 100;

/// Query parameters for the summary history
#[derive(Debug, Deserialize)]
pub struct SummaryHistoryParams {
    pub limit: Option<i64>,
}

fn store_error(context: &str, message: String) -> (StatusCode, Json<ErrorResponse>) {
    error!("{}: {}", context, message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("{}: {}", context, message))),
    )
}

async fn blocking_store<T, F>(state: &AppState, f: F) -> Result<T, String>
where
    F: FnOnce(&dyn pressroom_core::DocumentStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store();
    match tokio::task::spawn_blocking(move || f(store.as_ref())).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Most recent run summary.
///
/// GET /summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StoredSummary>, impl IntoResponse> {
    match blocking_store(&state, |store| store.latest_summary()).await {
        Ok(Some(summary)) => Ok(Json(summary)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("No summary found")),
        )),
        Err(e) => Err(store_error("Failed to load summary", e)),
    }
}

/// Run summary history, newest first.
///
/// GET /summaries
pub async fn list_summaries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryHistoryParams>,
) -> Result<Json<Vec<StoredSummary>>, impl IntoResponse> {
    let limit = params.limit.unwrap_or(10).clamp(1, MAX_HISTORY);
    blocking_store(&state, move |store| store.list_summaries(limit))
        .await
        .map(Json)
        .map_err(|e| store_error("Failed to load summaries", e))
}
