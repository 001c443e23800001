//! Types for the pipeline module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::discovery::DiscoveryError;
use crate::processor::ProcessingFailure;
use crate::store::{RunSummary, StoreError};

/// Error type for run-level failures.
///
/// Item-level problems never surface here; they are reported in the
/// [`RunReport`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Tables could not be guaranteed to exist.
    #[error("Schema initialization failed: {0}")]
    SchemaInit(#[source] StoreError),

    /// The scan root could not be walked.
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Another run is in progress on this coordinator.
    #[error("A pipeline run is already in progress")]
    AlreadyRunning,

    /// A blocking task could not be joined.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides the configured concurrency limit.
    pub concurrency: Option<usize>,
}

impl RunOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }
}

/// Cooperative cancellation for a run.
///
/// Clones share state; cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // The sender lives as long as `self`, so this is unreachable in practice.
            std::future::pending::<()>().await;
        }
    }
}

/// A document whose outcome could not be written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Per-item notification emitted as results arrive.
#[derive(Debug, Clone)]
pub enum ItemEvent {
    /// The record was written and counted.
    Persisted {
        path: PathBuf,
        record_id: i64,
        duration_secs: f64,
    },
    /// No publication date could be derived, so the document was not persisted.
    Skipped { path: PathBuf },
    /// Processing failed.
    Failed(ProcessingFailure),
    /// Processing succeeded but the record write failed.
    PersistFailed(PersistFailure),
}

/// Callback invoked on the coordinator task for every item event.
pub type ItemEventCallback = Arc<dyn Fn(&ItemEvent) + Send + Sync>;

/// Running totals for one run, updated only by the coordinator task.
#[derive(Debug, Clone, Default)]
pub struct RunTotals {
    pub total_processing_time: f64,
    pub files_processed: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl RunTotals {
    /// Accounts for a document whose record was written.
    pub fn record_persisted(&mut self, duration_secs: f64) {
        self.total_processing_time += duration_secs;
        self.files_processed += 1;
    }

    pub fn into_summary(self, cancelled: bool) -> RunSummary {
        RunSummary {
            total_processing_time: self.total_processing_time,
            total_files_processed: self.files_processed,
            failed_files: self.failed,
            skipped_files: self.skipped,
            cancelled,
        }
    }
}

/// Everything known about a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The aggregate, as written to the store.
    pub summary: RunSummary,
    pub failures: Vec<ProcessingFailure>,
    /// Documents without a publication date.
    pub skipped: Vec<PathBuf>,
    pub persist_failures: Vec<PersistFailure>,
    /// In-flight documents dropped after the cancellation grace period.
    pub abandoned: usize,
    pub cancelled: bool,
    /// False when every summary write attempt failed.
    pub summary_persisted: bool,
    pub wall_clock: Duration,
}

/// Snapshot of the coordinator's activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub running: bool,
    pub active_items: u64,
    pub dispatched_items: u64,
    pub completed_items: u64,
}
