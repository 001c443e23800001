use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};

use pressroom_core::{
    CancelSignal, Config, DocumentStore, PipelineCoordinator, RunOptions, RunReport, RunSummary,
    SanitizedConfig,
};

/// Outcome of the most recent background run.
#[derive(Debug, Clone, Serialize)]
pub struct LastRun {
    pub finished_at: DateTime<Utc>,
    pub summary: Option<RunSummary>,
    pub failed_items: usize,
    pub cancelled: bool,
    pub summary_persisted: bool,
    pub error: Option<String>,
}

impl LastRun {
    fn from_result(result: Result<RunReport, String>) -> Self {
        match result {
            Ok(report) => Self {
                finished_at: Utc::now(),
                failed_items: report.failures.len() + report.persist_failures.len(),
                cancelled: report.cancelled,
                summary_persisted: report.summary_persisted,
                summary: Some(report.summary),
                error: None,
            },
            Err(error) => Self {
                finished_at: Utc::now(),
                summary: None,
                failed_items: 0,
                cancelled: false,
                summary_persisted: false,
                error: Some(error),
            },
        }
    }
}

/// Why a background run could not be started.
#[derive(Debug)]
pub enum StartError {
    /// Neither `scan.root_dir` nor `ROOT_FOLDER` is set.
    NoRoot,
    /// A run is already in progress.
    AlreadyRunning,
}

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn DocumentStore>,
    coordinator: Arc<PipelineCoordinator>,
    shutdown: CancelSignal,
    last_run: RwLock<Option<LastRun>>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        coordinator: Arc<PipelineCoordinator>,
    ) -> Self {
        Self {
            config,
            store,
            coordinator,
            shutdown: CancelSignal::new(),
            last_run: RwLock::new(None),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    pub fn coordinator(&self) -> &PipelineCoordinator {
        &self.coordinator
    }

    pub async fn last_run(&self) -> Option<LastRun> {
        self.last_run.read().await.clone()
    }

    fn scan_root(&self) -> Option<PathBuf> {
        self.config.scan.root_dir.clone()
    }

    /// Starts a pipeline run in the background and returns immediately.
    pub fn start_processing(self: &Arc<Self>, options: RunOptions) -> Result<(), StartError> {
        let root = self.scan_root().ok_or(StartError::NoRoot)?;

        let handle = self
            .coordinator
            .start_run(root.clone(), options, self.shutdown.clone())
            .map_err(|_| StartError::AlreadyRunning)?;
        info!(root = %root.display(), "Background pipeline run started");

        let state = Arc::clone(self);
        tokio::spawn(async move {
            let result = match handle.await {
                Ok(Ok(report)) => Ok(report),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => {
                    error!("Pipeline task failed: {}", e);
                    Err(e.to_string())
                }
            };
            *state.last_run.write().await = Some(LastRun::from_result(result));
        });

        Ok(())
    }

    /// Cancels any run in progress and waits for it to wind down.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let grace = self.config.pipeline.cancel_grace_secs + 5;
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(grace);
        while self.coordinator.is_running() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }
}
