//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Document processing (results, durations, items in flight)
//! - Pipeline runs
//! - Summary persistence retries

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Documents
// =============================================================================

/// Documents handled, by result.
pub static DOCUMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pressroom_documents_total", "Total documents handled"),
        &["result"], // "persisted", "skipped", "failed", "persist_failed", "abandoned"
    )
    .unwrap()
});

/// Per-document processing time in seconds.
pub static DOCUMENT_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "pressroom_document_duration_seconds",
            "Time spent rasterizing, recognizing and classifying one document",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
    )
    .unwrap()
});

/// Documents currently being processed.
pub static ITEMS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "pressroom_items_in_flight",
        "Number of documents currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Runs
// =============================================================================

/// Pipeline runs, by result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pressroom_runs_total", "Total pipeline runs"),
        &["result"], // "completed", "cancelled", "failed"
    )
    .unwrap()
});

/// Summary writes that had to be retried.
pub static SUMMARY_RETRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "pressroom_summary_write_retries_total",
        "Total retried run summary writes",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Documents
        Box::new(DOCUMENTS_TOTAL.clone()),
        Box::new(DOCUMENT_DURATION.clone()),
        Box::new(ITEMS_IN_FLIGHT.clone()),
        // Runs
        Box::new(RUNS_TOTAL.clone()),
        Box::new(SUMMARY_RETRIES.clone()),
    ]
}
