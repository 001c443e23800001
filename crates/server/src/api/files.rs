//! Document record API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use pressroom_core::{DocumentFilter, DocumentRecord};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Maximum allowed limit for file queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for file queries
const DEFAULT_LIMIT: i64 = 100;

/// Query parameters for listing files
#[derive(Debug, Deserialize)]
pub struct ListFilesParams {
    /// Filter by containing directory name
    pub source_group: Option<String>,
    /// Earliest publication date (inclusive, `YYYY-MM-DD`)
    pub from: Option<NaiveDate>,
    /// Latest publication date (inclusive, `YYYY-MM-DD`)
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response for listing files
#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    pub files: Vec<DocumentRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// List persisted document records.
///
/// GET /files
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListFilesParams>,
) -> Result<Json<ListFilesResponse>, impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = DocumentFilter::new().with_limit(limit).with_offset(offset);
    if let Some(group) = params.source_group {
        filter = filter.with_source_group(group);
    }
    if let Some(from) = params.from {
        filter = filter.with_published_from(from);
    }
    if let Some(to) = params.to {
        filter = filter.with_published_to(to);
    }

    let store = state.store();
    let result = tokio::task::spawn_blocking(move || {
        let files = store.list_documents(&filter)?;
        let total = store.count_documents(&filter)?;
        Ok::<_, pressroom_core::StoreError>((files, total))
    })
    .await;

    match result {
        Ok(Ok((files, total))) => Ok(Json(ListFilesResponse {
            files,
            total,
            limit,
            offset,
        })),
        Ok(Err(e)) => {
            error!("Failed to list files: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Failed to list files: {}", e))),
            ))
        }
        Err(e) => {
            error!("File listing task failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to list files")),
            ))
        }
    }
}
