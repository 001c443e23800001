//! Types for the processor module.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A file discovered under the scan root, identified by its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    path: PathBuf,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Result of successfully processing one work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    /// Source path.
    pub path: PathBuf,
    /// Final path component.
    pub file_name: String,
    /// Name of the containing directory.
    pub source_group: String,
    /// Publication date parsed from the file name.
    pub publication_date: Option<NaiveDate>,
    /// Time spent rasterizing, recognizing and classifying.
    pub elapsed: Duration,
    /// Number of pages recognized.
    pub page_count: usize,
    /// Unit mentions, in discovery order.
    pub military_units: Vec<String>,
    /// Administrative division mentions, in discovery order.
    pub political_divisions: Vec<String>,
}

impl ProcessingOutcome {
    /// Elapsed time in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Stage at which an item failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Rasterization,
    Recognition,
    Tagging,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Rasterization => "rasterization",
            FailureKind::Recognition => "recognition",
            FailureKind::Tagging => "tagging",
        };
        f.write_str(name)
    }
}

/// A work item that could not be completed.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
#[error("{kind} failed for {}: {message}", .path.display())]
pub struct ProcessingFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

impl ProcessingFailure {
    pub fn new(path: impl Into<PathBuf>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Per-item result handed from a worker to the coordinator.
pub type ItemResult = Result<ProcessingOutcome, ProcessingFailure>;
