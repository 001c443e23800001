//! Pipeline coordinator implementation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::classifier::Classifier;
use crate::config::Config;
use crate::discovery::WorkDiscoverer;
use crate::extraction::Capabilities;
use crate::metrics;
use crate::processor::{DocumentProcessor, ItemResult, ProcessingFailure, WorkItem};
use crate::store::{DocumentStore, NewDocumentRecord, RunSummary};

use super::config::PipelineConfig;
use super::types::{
    CancelSignal, ItemEvent, ItemEventCallback, PersistFailure, PipelineError, PipelineStatus,
    RunOptions, RunReport, RunTotals,
};

/// Tracks activity counters for the worker pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    dispatched: AtomicU64,
    completed: AtomicU64,
}

/// Marks one document as in flight for as long as it lives.
struct ActiveGuard(Arc<PoolStats>);

impl ActiveGuard {
    fn enter(stats: Arc<PoolStats>) -> Self {
        stats.active.fetch_add(1, Ordering::SeqCst);
        metrics::ITEMS_IN_FLIGHT.inc();
        Self(stats)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
        metrics::ITEMS_IN_FLIGHT.dec();
    }
}

/// Holds the coordinator's single-run claim until dropped.
struct RunClaim(Arc<AtomicBool>);

impl Drop for RunClaim {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Results accumulated on the coordinator task.
#[derive(Default)]
struct RunAccumulator {
    totals: RunTotals,
    failures: Vec<ProcessingFailure>,
    skipped: Vec<PathBuf>,
    persist_failures: Vec<PersistFailure>,
}

/// Drives one pipeline run: discovery, bounded-parallel processing,
/// persistence of each record and one summary row per run.
///
/// Workers only process documents. Every store write and every update to the
/// running totals happens on the task that called [`run`](Self::run), so
/// totals never need a lock and only count records that were written.
pub struct PipelineCoordinator {
    config: PipelineConfig,
    discoverer: WorkDiscoverer,
    processor: Arc<DocumentProcessor>,
    store: Arc<dyn DocumentStore>,
    on_event: Option<ItemEventCallback>,
    running: Arc<AtomicBool>,
    stats: Arc<PoolStats>,
}

impl PipelineCoordinator {
    /// Creates a new coordinator.
    pub fn new(
        config: PipelineConfig,
        discoverer: WorkDiscoverer,
        processor: DocumentProcessor,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            config,
            discoverer,
            processor: Arc::new(processor),
            store,
            on_event: None,
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(PoolStats::default()),
        }
    }

    /// Wires a coordinator from application configuration.
    pub fn from_config(
        config: &Config,
        capabilities: Capabilities,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let processor = DocumentProcessor::new(capabilities, Classifier::new(&config.classifier))
            .with_classification(config.pipeline.classify_entities);
        Self::new(
            config.pipeline.clone(),
            WorkDiscoverer::new(config.scan.extension.clone()),
            processor,
            store,
        )
    }

    /// Sets a callback for per-item events.
    pub fn with_event_callback(mut self, callback: ItemEventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns a snapshot of the current activity.
    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            running: self.is_running(),
            active_items: self.stats.active.load(Ordering::SeqCst),
            dispatched_items: self.stats.dispatched.load(Ordering::Relaxed),
            completed_items: self.stats.completed.load(Ordering::Relaxed),
        }
    }

    /// `min(requested, available parallelism)`, never below one.
    pub fn effective_concurrency(&self, options: &RunOptions) -> usize {
        let requested = options.concurrency.unwrap_or(self.config.max_concurrency);
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        requested.min(cpus).max(1)
    }

    /// Runs the pipeline over `root` and waits for it to finish.
    pub async fn run(
        &self,
        root: &Path,
        options: RunOptions,
        cancel: CancelSignal,
    ) -> Result<RunReport, PipelineError> {
        let claim = self.claim()?;
        self.execute(root, options, cancel, claim).await
    }

    /// Claims the coordinator and runs the pipeline on a background task.
    ///
    /// Returns `AlreadyRunning` immediately if a run is in progress.
    pub fn start_run(
        self: &Arc<Self>,
        root: PathBuf,
        options: RunOptions,
        cancel: CancelSignal,
    ) -> Result<JoinHandle<Result<RunReport, PipelineError>>, PipelineError> {
        let claim = self.claim()?;
        let coordinator = Arc::clone(self);
        Ok(tokio::spawn(async move {
            coordinator.execute(&root, options, cancel, claim).await
        }))
    }

    fn claim(&self) -> Result<RunClaim, PipelineError> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| PipelineError::AlreadyRunning)?;
        Ok(RunClaim(Arc::clone(&self.running)))
    }

    async fn execute(
        &self,
        root: &Path,
        options: RunOptions,
        cancel: CancelSignal,
        _claim: RunClaim,
    ) -> Result<RunReport, PipelineError> {
        let result = self.execute_inner(root, options, cancel).await;
        if let Err(ref e) = result {
            error!("Pipeline run failed: {}", e);
            metrics::RUNS_TOTAL.with_label_values(&["failed"]).inc();
        }
        result
    }

    async fn execute_inner(
        &self,
        root: &Path,
        options: RunOptions,
        cancel: CancelSignal,
    ) -> Result<RunReport, PipelineError> {
        let started = Instant::now();
        self.stats.dispatched.store(0, Ordering::Relaxed);
        self.stats.completed.store(0, Ordering::Relaxed);

        let store = Arc::clone(&self.store);
        blocking(move || store.initialize_schema())
            .await?
            .map_err(PipelineError::SchemaInit)?;

        let items = self.discoverer.discover(root)?;
        let concurrency = self.effective_concurrency(&options);
        info!(
            root = %root.display(),
            concurrency,
            "Starting pipeline run"
        );

        // Discovery walks the tree on the blocking pool and hands items over
        // as workers free up.
        let (tx, mut rx) = mpsc::channel::<WorkItem>(concurrency);
        tokio::task::spawn_blocking(move || {
            for item in items {
                if tx.blocking_send(item).is_err() {
                    break;
                }
            }
        });

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks: JoinSet<ItemResult> = JoinSet::new();
        let mut acc = RunAccumulator::default();
        let mut exhausted = false;
        let mut cancelled = false;

        loop {
            if exhausted && tasks.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    self.handle_joined(joined, &mut acc).await;
                }

                next = next_work(&semaphore, &mut rx), if !exhausted => match next {
                    Some((permit, item)) => self.dispatch(&mut tasks, permit, item),
                    None => exhausted = true,
                },
            }
        }
        drop(rx);

        let mut abandoned = 0;
        if cancelled {
            let grace = Duration::from_secs(self.config.cancel_grace_secs);
            info!(
                in_flight = tasks.len(),
                "Cancellation requested, waiting up to {}s for in-flight documents",
                grace.as_secs()
            );
            let deadline = tokio::time::Instant::now() + grace;
            loop {
                match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                    Ok(Some(joined)) => self.handle_joined(joined, &mut acc).await,
                    Ok(None) => break,
                    Err(_) => {
                        abandoned = tasks.len();
                        warn!(abandoned, "Grace period elapsed, abandoning in-flight documents");
                        metrics::DOCUMENTS_TOTAL
                            .with_label_values(&["abandoned"])
                            .inc_by(abandoned as u64);
                        tasks.abort_all();
                        while tasks.join_next().await.is_some() {}
                        break;
                    }
                }
            }
        }

        let summary = acc.totals.into_summary(cancelled);
        let summary_persisted = self.persist_summary(&summary).await;

        let wall_clock = started.elapsed();
        metrics::RUNS_TOTAL
            .with_label_values(&[if cancelled { "cancelled" } else { "completed" }])
            .inc();
        info!(
            processed = summary.total_files_processed,
            failed = summary.failed_files,
            skipped = summary.skipped_files,
            cancelled,
            "Pipeline run finished in {:.2}s",
            wall_clock.as_secs_f64()
        );

        Ok(RunReport {
            summary,
            failures: acc.failures,
            skipped: acc.skipped,
            persist_failures: acc.persist_failures,
            abandoned,
            cancelled,
            summary_persisted,
            wall_clock,
        })
    }

    fn dispatch(
        &self,
        tasks: &mut JoinSet<ItemResult>,
        permit: OwnedSemaphorePermit,
        item: WorkItem,
    ) {
        self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
        debug!(path = %item, "Dispatching document");

        let processor = Arc::clone(&self.processor);
        let stats = Arc::clone(&self.stats);
        tasks.spawn(async move {
            let _permit = permit;
            let _active = ActiveGuard::enter(stats);
            processor.process(&item).await
        });
    }

    async fn handle_joined(
        &self,
        joined: Result<ItemResult, JoinError>,
        acc: &mut RunAccumulator,
    ) {
        self.stats.completed.fetch_add(1, Ordering::Relaxed);

        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                error!("Worker task failed: {}", e);
                acc.totals.failed += 1;
                metrics::DOCUMENTS_TOTAL.with_label_values(&["failed"]).inc();
                return;
            }
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(failure) => {
                warn!(
                    path = %failure.path.display(),
                    kind = %failure.kind,
                    "Document failed: {}",
                    failure.message
                );
                acc.totals.failed += 1;
                metrics::DOCUMENTS_TOTAL.with_label_values(&["failed"]).inc();
                self.emit(&ItemEvent::Failed(failure.clone()));
                acc.failures.push(failure);
                return;
            }
        };

        if outcome.publication_date.is_none() && self.config.require_publication_date {
            info!(
                path = %outcome.path.display(),
                "Skipping document without a publication date"
            );
            acc.totals.skipped += 1;
            metrics::DOCUMENTS_TOTAL.with_label_values(&["skipped"]).inc();
            self.emit(&ItemEvent::Skipped {
                path: outcome.path.clone(),
            });
            acc.skipped.push(outcome.path);
            return;
        }

        let record = NewDocumentRecord::from(&outcome);
        let store = Arc::clone(&self.store);
        let written = match blocking(move || store.insert_document(&record)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match written {
            Ok(stored) => {
                let duration_secs = outcome.duration_secs();
                acc.totals.record_persisted(duration_secs);
                metrics::DOCUMENTS_TOTAL.with_label_values(&["persisted"]).inc();
                metrics::DOCUMENT_DURATION.observe(duration_secs);
                debug!(
                    path = %outcome.path.display(),
                    record_id = stored.id,
                    duration_secs,
                    "Persisted document"
                );
                self.emit(&ItemEvent::Persisted {
                    path: outcome.path,
                    record_id: stored.id,
                    duration_secs,
                });
            }
            Err(message) => {
                warn!(
                    path = %outcome.path.display(),
                    "Failed to persist document: {}",
                    message
                );
                acc.totals.failed += 1;
                metrics::DOCUMENTS_TOTAL
                    .with_label_values(&["persist_failed"])
                    .inc();
                let failure = PersistFailure {
                    path: outcome.path,
                    message,
                };
                self.emit(&ItemEvent::PersistFailed(failure.clone()));
                acc.persist_failures.push(failure);
            }
        }
    }

    /// Appends the run summary, retrying per the configured policy.
    async fn persist_summary(&self, summary: &RunSummary) -> bool {
        let retry = &self.config.summary_retry;
        let attempts = retry.max_attempts.max(1);

        for attempt in 1..=attempts {
            let store = Arc::clone(&self.store);
            let row = summary.clone();
            let result = match blocking(move || store.append_summary(&row)).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            match result {
                Ok(stored) => {
                    debug!(summary_id = stored.id, "Persisted run summary");
                    return true;
                }
                Err(message) => {
                    warn!(attempt, attempts, "Failed to persist run summary: {}", message);
                }
            }

            if attempt < attempts {
                metrics::SUMMARY_RETRIES.inc();
                tokio::time::sleep(Duration::from_millis(retry.delay_ms)).await;
            }
        }

        warn!(
            "Run summary could not be persisted after {} attempts",
            attempts
        );
        false
    }

    fn emit(&self, event: &ItemEvent) {
        if let Some(ref callback) = self.on_event {
            callback(event);
        }
    }
}

/// Waits for a free worker slot, then for the next discovered item.
async fn next_work(
    semaphore: &Arc<Semaphore>,
    rx: &mut mpsc::Receiver<WorkItem>,
) -> Option<(OwnedSemaphorePermit, WorkItem)> {
    let permit = Arc::clone(semaphore).acquire_owned().await.ok()?;
    let item = rx.recv().await?;
    Some((permit, item))
}

/// Runs a store call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDocumentStore, MockRasterizer, MockRecognizer, MockTagger};
    use tempfile::TempDir;

    fn coordinator(config: PipelineConfig, store: Arc<MockDocumentStore>) -> PipelineCoordinator {
        let capabilities = Capabilities::new(
            Arc::new(MockRasterizer::new()),
            Arc::new(MockRecognizer::new()),
            Arc::new(MockTagger::new()),
        );
        PipelineCoordinator::new(
            config,
            WorkDiscoverer::default(),
            DocumentProcessor::new(capabilities, Classifier::default()),
            store,
        )
    }

    #[test]
    fn test_effective_concurrency_bounds() {
        let coord = coordinator(PipelineConfig::default(), Arc::new(MockDocumentStore::new()));
        let cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);

        assert_eq!(coord.effective_concurrency(&RunOptions::default()), 4.min(cpus));
        assert_eq!(
            coord.effective_concurrency(&RunOptions::default().with_concurrency(0)),
            1
        );
        assert_eq!(
            coord.effective_concurrency(&RunOptions::default().with_concurrency(1000)),
            cpus
        );
    }

    #[tokio::test]
    async fn test_second_claim_is_rejected() {
        let coord = coordinator(PipelineConfig::default(), Arc::new(MockDocumentStore::new()));
        let claim = coord.claim().unwrap();
        assert!(coord.is_running());
        assert!(matches!(coord.claim(), Err(PipelineError::AlreadyRunning)));

        drop(claim);
        assert!(!coord.is_running());
        assert!(coord.claim().is_ok());
    }

    #[tokio::test]
    async fn test_empty_root_writes_zero_summary() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MockDocumentStore::new());
        let coord = coordinator(PipelineConfig::default(), store.clone());

        let report = coord
            .run(dir.path(), RunOptions::default(), CancelSignal::new())
            .await
            .unwrap();
        assert_eq!(report.summary, RunSummary::default());
        assert!(report.summary_persisted);
        assert_eq!(store.summaries().len(), 1);
        assert!(!coord.is_running());
    }

    #[tokio::test]
    async fn test_schema_failure_aborts_before_dispatch() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a_01-01-2020.pdf"), b"%PDF").unwrap();
        let store = Arc::new(MockDocumentStore::new());
        store.set_fail_schema(true);
        let coord = coordinator(PipelineConfig::default(), store.clone());

        let result = coord
            .run(dir.path(), RunOptions::default(), CancelSignal::new())
            .await;
        assert!(matches!(result, Err(PipelineError::SchemaInit(_))));
        assert_eq!(coord.status().dispatched_items, 0);
        assert!(store.summaries().is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_discovery_error() {
        let dir = TempDir::new().unwrap();
        let coord = coordinator(PipelineConfig::default(), Arc::new(MockDocumentStore::new()));
        let result = coord
            .run(&dir.path().join("missing"), RunOptions::default(), CancelSignal::new())
            .await;
        assert!(matches!(result, Err(PipelineError::Discovery(_))));
        assert!(!coord.is_running());
    }

    #[tokio::test]
    async fn test_summary_retry_then_success() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MockDocumentStore::new());
        store.fail_next_summaries(2);
        let coord = coordinator(
            PipelineConfig::default().with_summary_retry(3, 1),
            store.clone(),
        );

        let report = coord
            .run(dir.path(), RunOptions::default(), CancelSignal::new())
            .await
            .unwrap();
        assert!(report.summary_persisted);
        assert_eq!(store.summary_attempts(), 3);
        assert_eq!(store.summaries().len(), 1);
    }

    #[tokio::test]
    async fn test_summary_retry_exhausted_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MockDocumentStore::new());
        store.fail_next_summaries(10);
        let coord = coordinator(
            PipelineConfig::default().with_summary_retry(2, 1),
            store.clone(),
        );

        let report = coord
            .run(dir.path(), RunOptions::default(), CancelSignal::new())
            .await
            .unwrap();
        assert!(!report.summary_persisted);
        assert_eq!(store.summary_attempts(), 2);
    }
}
