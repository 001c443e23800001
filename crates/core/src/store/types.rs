//! Types for the persistence gateway.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::processor::ProcessingOutcome;

/// Errors from the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("schema initialization failed: {0}")]
    SchemaInit(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A document record ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocumentRecord {
    pub file_path: String,
    pub file_name: String,
    /// Seconds spent processing the document.
    pub processing_time: f64,
    pub publication_date: Option<NaiveDate>,
    pub source_group: String,
    pub military_units: Vec<String>,
    pub political_divisions: Vec<String>,
}

impl From<&ProcessingOutcome> for NewDocumentRecord {
    fn from(outcome: &ProcessingOutcome) -> Self {
        Self {
            file_path: outcome.path.to_string_lossy().into_owned(),
            file_name: outcome.file_name.clone(),
            processing_time: outcome.duration_secs(),
            publication_date: outcome.publication_date,
            source_group: outcome.source_group.clone(),
            military_units: outcome.military_units.clone(),
            political_divisions: outcome.political_divisions.clone(),
        }
    }
}

/// A persisted document record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Surrogate key assigned by the store.
    pub id: i64,
    pub processed_at: DateTime<Utc>,
    pub file_path: String,
    pub file_name: String,
    pub processing_time: f64,
    pub publication_date: Option<NaiveDate>,
    pub source_group: String,
    pub military_units: Vec<String>,
    pub political_divisions: Vec<String>,
}

/// Filter for listing document records.
#[derive(Debug, Clone)]
pub struct DocumentFilter {
    pub source_group: Option<String>,
    /// Inclusive lower bound on the publication date.
    pub published_from: Option<NaiveDate>,
    /// Inclusive upper bound on the publication date.
    pub published_to: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self {
            source_group: None,
            published_from: None,
            published_to: None,
            limit: 100,
            offset: 0,
        }
    }

    pub fn with_source_group(mut self, source_group: impl Into<String>) -> Self {
        self.source_group = Some(source_group.into());
        self
    }

    pub fn with_published_from(mut self, date: NaiveDate) -> Self {
        self.published_from = Some(date);
        self
    }

    pub fn with_published_to(mut self, date: NaiveDate) -> Self {
        self.published_to = Some(date);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Aggregate over one pipeline run.
///
/// `total_processing_time` sums per-document durations, not the wall clock of
/// the run. Only documents whose record was written count toward
/// `total_files_processed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_processing_time: f64,
    pub total_files_processed: u64,
    #[serde(default)]
    pub failed_files: u64,
    #[serde(default)]
    pub skipped_files: u64,
    #[serde(default)]
    pub cancelled: bool,
}

/// A summary row as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSummary {
    pub id: i64,
    pub completed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_record_from_outcome() {
        let outcome = ProcessingOutcome {
            path: PathBuf::from("/archive/Daily Post/p_01-02-2003.pdf"),
            file_name: "p_01-02-2003.pdf".to_string(),
            source_group: "Daily Post".to_string(),
            publication_date: NaiveDate::from_ymd_opt(2003, 2, 1),
            elapsed: Duration::from_millis(1500),
            page_count: 4,
            military_units: vec!["Brigada XVII".to_string()],
            political_divisions: vec![],
        };

        let record = NewDocumentRecord::from(&outcome);
        assert_eq!(record.file_path, "/archive/Daily Post/p_01-02-2003.pdf");
        assert_eq!(record.processing_time, 1.5);
        assert_eq!(record.military_units, vec!["Brigada XVII"]);
    }

    #[test]
    fn test_stored_summary_serializes_flat() {
        let stored = StoredSummary {
            id: 7,
            completed_at: Utc::now(),
            summary: RunSummary {
                total_processing_time: 12.5,
                total_files_processed: 3,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["total_files_processed"], 3);
        assert_eq!(json["cancelled"], false);
    }

    #[test]
    fn test_filter_builder() {
        let filter = DocumentFilter::new()
            .with_source_group("Daily Post")
            .with_limit(10)
            .with_offset(20);
        assert_eq!(filter.source_group.as_deref(), Some("Daily Post"));
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.offset, 20);
    }
}
