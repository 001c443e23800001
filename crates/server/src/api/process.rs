//! Pipeline trigger API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use pressroom_core::{PipelineStatus, RunOptions};

use super::handlers::ErrorResponse;
use crate::state::{AppState, LastRun, StartError};

/// Query parameters for starting a run
#[derive(Debug, Default, Deserialize)]
pub struct ProcessParams {
    /// Overrides the configured concurrency for this run
    pub concurrency: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProcessStartedResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessStatusResponse {
    #[serde(flatten)]
    pub status: PipelineStatus,
    pub last_run: Option<LastRun>,
}

/// Start a pipeline run over the configured scan root.
///
/// Returns as soon as the run is started; its results are observable
/// through GET /summary and GET /process/status.
///
/// POST /process
pub async fn start_processing(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProcessParams>,
) -> Result<(StatusCode, Json<ProcessStartedResponse>), (StatusCode, Json<ErrorResponse>)> {
    let options = RunOptions {
        concurrency: params.concurrency,
    };

    match state.start_processing(options) {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(ProcessStartedResponse {
                message: "Processing started".to_string(),
            }),
        )),
        Err(StartError::NoRoot) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "No scan root configured (set scan.root_dir or ROOT_FOLDER)",
            )),
        )),
        Err(StartError::AlreadyRunning) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("A pipeline run is already in progress")),
        )),
    }
}

/// Current pipeline activity and the outcome of the last run.
///
/// GET /process/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ProcessStatusResponse> {
    Json(ProcessStatusResponse {
        status: state.coordinator().status(),
        last_run: state.last_run().await,
    })
}
