//! Pipeline lifecycle integration tests.
//!
//! These tests drive the coordinator against mock extraction capabilities:
//! - Counting and the publication date policy
//! - Failure isolation
//! - Concurrency limits
//! - Cancellation and the grace period
//! - Summary persistence and schema idempotence

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use pressroom_core::{
    classifier::Classifier,
    discovery::WorkDiscoverer,
    pipeline::{CancelSignal, ItemEvent, PipelineConfig, PipelineCoordinator, PipelineError, RunOptions},
    processor::{DocumentProcessor, FailureKind},
    store::{DocumentFilter, DocumentStore, SqliteDocumentStore},
    testing::{
        fixtures::{self, MockCapabilities},
        MockDocumentStore,
    },
};

/// Test helper wiring a coordinator to mocks and a temporary archive.
struct TestHarness {
    mocks: MockCapabilities,
    store: Arc<dyn DocumentStore>,
    root: TempDir,
    _db_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let db_dir = TempDir::new().expect("Failed to create db dir");
        let store = SqliteDocumentStore::new(&db_dir.path().join("test.db"))
            .expect("Failed to open store");
        Self::with_store(Arc::new(store), db_dir)
    }

    fn with_mock_store(store: Arc<MockDocumentStore>) -> Self {
        let db_dir = TempDir::new().expect("Failed to create db dir");
        Self::with_store(store, db_dir)
    }

    fn with_store(store: Arc<dyn DocumentStore>, db_dir: TempDir) -> Self {
        Self {
            mocks: fixtures::mock_capabilities(),
            store,
            root: TempDir::new().expect("Failed to create archive root"),
            _db_dir: db_dir,
        }
    }

    fn coordinator(&self, config: PipelineConfig) -> PipelineCoordinator {
        let processor = DocumentProcessor::new(
            self.mocks.capabilities.clone(),
            Classifier::default(),
        )
        .with_classification(config.classify_entities);
        PipelineCoordinator::new(
            config,
            WorkDiscoverer::default(),
            processor,
            Arc::clone(&self.store),
        )
    }

    fn write(&self, names: &[&str]) -> Vec<PathBuf> {
        fixtures::write_documents(self.root.path(), names)
    }

    fn write_dated(&self, count: usize) -> Vec<PathBuf> {
        let names = fixtures::dated_names(count);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        self.write(&refs)
    }

    fn persisted_count(&self) -> i64 {
        self.store
            .count_documents(&DocumentFilter::new())
            .expect("count documents")
    }
}

#[tokio::test]
async fn test_all_dated_documents_are_counted() {
    let harness = TestHarness::new();
    harness.write_dated(6);
    harness.mocks.rasterizer.set_default_pages(2);

    let report = harness
        .coordinator(PipelineConfig::default())
        .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(report.summary.total_files_processed, 6);
    assert_eq!(harness.persisted_count(), 6);
    assert!(report.failures.is_empty());
    assert!(report.skipped.is_empty());
    assert!(!report.cancelled);
    assert!(report.summary_persisted);

    let latest = harness.store.latest_summary().unwrap().unwrap();
    assert_eq!(latest.summary, report.summary);
    assert_eq!(harness.mocks.recognizer.recognized_count(), 12);
}

#[tokio::test]
async fn test_total_time_sums_persisted_durations() {
    let harness = TestHarness::new();
    harness.write_dated(3);

    let report = harness
        .coordinator(PipelineConfig::default())
        .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
        .await
        .unwrap();

    let records = harness.store.list_documents(&DocumentFilter::new()).unwrap();
    let sum: f64 = records.iter().map(|r| r.processing_time).sum();
    assert!((report.summary.total_processing_time - sum).abs() < 1e-9);
}

#[tokio::test]
async fn test_undated_documents_are_skipped() {
    let harness = TestHarness::new();
    harness.write(&[
        "Daily Post/post_15-03-2021.pdf",
        "Daily Post/post_undated.pdf",
        "Herald/herald_16-03-2021.pdf",
        "Herald/herald_31-02-2021.pdf",
    ]);

    let report = harness
        .coordinator(PipelineConfig::default())
        .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(report.summary.total_files_processed, 2);
    assert_eq!(report.summary.skipped_files, 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.summary.failed_files, 0);
    assert_eq!(harness.persisted_count(), 2);

    let post = harness
        .store
        .list_documents(&DocumentFilter::new().with_source_group("Daily Post"))
        .unwrap();
    assert_eq!(post.len(), 1);
    assert_eq!(post[0].file_name, "post_15-03-2021.pdf");
}

#[tokio::test]
async fn test_undated_documents_persisted_when_date_not_required() {
    let harness = TestHarness::new();
    harness.write(&["a_01-01-2020.pdf", "b.pdf"]);

    let report = harness
        .coordinator(PipelineConfig::default().with_require_publication_date(false))
        .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(report.summary.total_files_processed, 2);
    assert!(report.skipped.is_empty());
    let undated = harness
        .store
        .list_documents(&DocumentFilter::new())
        .unwrap()
        .into_iter()
        .filter(|r| r.publication_date.is_none())
        .count();
    assert_eq!(undated, 1);
}

#[tokio::test]
async fn test_failing_document_does_not_stop_the_run() {
    let harness = TestHarness::new();
    let paths = harness.write_dated(5);
    harness.mocks.rasterizer.fail_path(&paths[2]);

    let report = harness
        .coordinator(PipelineConfig::default())
        .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(report.summary.total_files_processed, 4);
    assert_eq!(report.summary.failed_files, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, paths[2]);
    assert_eq!(report.failures[0].kind, FailureKind::Rasterization);
    assert_eq!(harness.persisted_count(), 4);

    let failed_path = paths[2].to_string_lossy().into_owned();
    let records = harness.store.list_documents(&DocumentFilter::new()).unwrap();
    assert!(records.iter().all(|r| r.file_path != failed_path));
}

#[tokio::test]
async fn test_entities_are_classified_into_records() {
    let harness = TestHarness::new();
    harness.write(&["Post/p_01-06-2001.pdf"]);
    harness.mocks.tagger.set_entities(vec![
        fixtures::org("3rd Battalion"),
        fixtures::gpe("Springfield Municipality"),
        fixtures::org("Springfield Gazette"),
    ]);

    harness
        .coordinator(PipelineConfig::default())
        .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
        .await
        .unwrap();

    let records = harness.store.list_documents(&DocumentFilter::new()).unwrap();
    assert_eq!(records[0].military_units, vec!["3rd Battalion"]);
    assert_eq!(records[0].political_divisions, vec!["Springfield Municipality"]);
    assert_eq!(records[0].source_group, "Post");
}

#[tokio::test]
async fn test_concurrency_limit_is_respected() {
    let harness = TestHarness::new();
    harness.write_dated(8);
    harness.mocks.rasterizer.set_delay(Duration::from_millis(30));

    let coordinator = harness.coordinator(PipelineConfig::default());
    let options = RunOptions::default().with_concurrency(2);
    let limit = coordinator.effective_concurrency(&options);
    assert!(limit <= 2);

    let report = coordinator
        .run(harness.root.path(), options, CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(report.summary.total_files_processed, 8);
    let observed = harness.mocks.rasterizer.max_in_flight();
    assert!(observed >= 1);
    assert!(observed <= limit, "observed {} concurrent items, limit {}", observed, limit);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_limit_on_multi_thread_runtime() {
    let harness = TestHarness::new();
    harness.write_dated(12);
    harness.mocks.rasterizer.set_delay(Duration::from_millis(20));

    let coordinator = harness.coordinator(PipelineConfig::default().with_max_concurrency(3));
    let limit = coordinator.effective_concurrency(&RunOptions::default());

    let report = coordinator
        .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(report.summary.total_files_processed, 12);
    assert!(harness.mocks.rasterizer.max_in_flight() <= limit);
    assert_eq!(coordinator.status().active_items, 0);
    assert_eq!(coordinator.status().completed_items, 12);
}

#[tokio::test]
async fn test_cancellation_stops_dispatch_and_persists_partial_summary() {
    let harness = TestHarness::new();
    harness.write_dated(5);
    harness.mocks.rasterizer.set_delay(Duration::from_millis(50));

    let cancel = CancelSignal::new();
    let started_at_cancel = Arc::new(AtomicUsize::new(0));
    let persisted_events = Arc::new(AtomicUsize::new(0));

    let callback = {
        let cancel = cancel.clone();
        let rasterizer = harness.mocks.rasterizer.clone();
        let started_at_cancel = Arc::clone(&started_at_cancel);
        let persisted_events = Arc::clone(&persisted_events);
        Arc::new(move |event: &ItemEvent| {
            if let ItemEvent::Persisted { .. } = event {
                if persisted_events.fetch_add(1, Ordering::SeqCst) == 0 {
                    started_at_cancel.store(rasterizer.started_count(), Ordering::SeqCst);
                    cancel.cancel();
                }
            }
        })
    };

    let report = harness
        .coordinator(PipelineConfig::default())
        .with_event_callback(callback)
        .run(
            harness.root.path(),
            RunOptions::default().with_concurrency(1),
            cancel,
        )
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.abandoned, 0);
    assert_eq!(
        harness.mocks.rasterizer.started_count(),
        started_at_cancel.load(Ordering::SeqCst),
        "no document may start after cancellation"
    );
    assert_eq!(
        report.summary.total_files_processed as usize,
        persisted_events.load(Ordering::SeqCst)
    );
    assert!(report.summary.total_files_processed < 5);

    let latest = harness.store.latest_summary().unwrap().unwrap();
    assert!(latest.summary.cancelled);
    assert_eq!(latest.summary.total_files_processed, report.summary.total_files_processed);
}

#[tokio::test]
async fn test_in_flight_documents_abandoned_after_grace_period() {
    let harness = TestHarness::new();
    harness.write_dated(3);
    harness.mocks.rasterizer.set_delay(Duration::from_secs(30));

    let cancel = CancelSignal::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let report = harness
        .coordinator(PipelineConfig::default().with_cancel_grace_secs(0))
        .run(harness.root.path(), RunOptions::default(), cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert!(report.abandoned >= 1);
    assert_eq!(report.summary.total_files_processed, 0);
    assert_eq!(harness.persisted_count(), 0);
    assert_eq!(harness.mocks.rasterizer.in_flight(), 0);
    assert!(report.summary_persisted);
}

#[tokio::test]
async fn test_record_write_failure_is_not_counted() {
    let store = Arc::new(MockDocumentStore::new());
    let harness = TestHarness::with_mock_store(Arc::clone(&store));
    let paths = harness.write_dated(3);
    store.fail_insert_for(paths[0].to_string_lossy());

    let report = harness
        .coordinator(PipelineConfig::default())
        .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
        .await
        .unwrap();

    assert_eq!(report.summary.total_files_processed, 2);
    assert_eq!(report.persist_failures.len(), 1);
    assert_eq!(report.persist_failures[0].path, paths[0]);
    assert_eq!(store.documents().len(), 2);
    assert_eq!(store.summaries()[0].summary.total_files_processed, 2);
}

#[tokio::test]
async fn test_failure_events_are_reported() {
    let harness = TestHarness::new();
    let paths = harness.write(&["good_01-01-2020.pdf", "bad_01-01-2020.pdf", "undated.pdf"]);
    harness.mocks.rasterizer.fail_path(&paths[1]);

    let events = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&events);
    let report = harness
        .coordinator(PipelineConfig::default())
        .with_event_callback(Arc::new(move |event: &ItemEvent| {
            recorded.lock().unwrap().push(event.clone());
        }))
        .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
        .await
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 3);
    let failed: Vec<PathBuf> = events
        .iter()
        .filter_map(|e| match e {
            ItemEvent::Failed(f) => Some(f.path.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![paths[1].clone()]);
    assert!(events
        .iter()
        .any(|e| matches!(e, ItemEvent::Skipped { path } if path == &paths[2])));
    assert_eq!(report.summary.total_files_processed, 1);
}

#[tokio::test]
async fn test_repeated_runs_append_summaries() {
    let harness = TestHarness::new();
    harness.write_dated(2);
    let coordinator = harness.coordinator(PipelineConfig::default());

    for _ in 0..2 {
        coordinator
            .run(harness.root.path(), RunOptions::default(), CancelSignal::new())
            .await
            .unwrap();
    }

    harness.store.initialize_schema().unwrap();
    assert_eq!(harness.persisted_count(), 4);
    let history = harness.store.list_summaries(10).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].id > history[1].id);
}

#[tokio::test]
async fn test_concurrent_start_is_rejected() {
    let harness = TestHarness::new();
    harness.write_dated(2);
    harness.mocks.rasterizer.set_delay(Duration::from_millis(100));
    let coordinator = Arc::new(harness.coordinator(PipelineConfig::default()));

    let handle = coordinator
        .start_run(
            harness.root.path().to_path_buf(),
            RunOptions::default(),
            CancelSignal::new(),
        )
        .unwrap();
    assert!(coordinator.status().running);

    let second = coordinator.start_run(
        harness.root.path().to_path_buf(),
        RunOptions::default(),
        CancelSignal::new(),
    );
    assert!(matches!(second, Err(PipelineError::AlreadyRunning)));

    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.summary.total_files_processed, 2);
    assert!(!coordinator.status().running);
}
