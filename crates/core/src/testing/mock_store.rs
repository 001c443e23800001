//! Mock document store for testing.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::store::{
    DocumentFilter, DocumentRecord, DocumentStore, NewDocumentRecord, RunSummary, StoreError,
    StoredSummary,
};

/// In-memory implementation of the DocumentStore trait.
///
/// Failures can be injected for schema creation, for inserts of chosen
/// paths and for a number of consecutive summary writes.
#[derive(Debug, Clone, Default)]
pub struct MockDocumentStore {
    documents: Arc<Mutex<Vec<DocumentRecord>>>,
    summaries: Arc<Mutex<Vec<StoredSummary>>>,
    schema_calls: Arc<AtomicUsize>,
    fail_schema: Arc<Mutex<bool>>,
    failing_inserts: Arc<Mutex<HashSet<String>>>,
    failing_summaries: Arc<AtomicUsize>,
    summary_attempts: Arc<AtomicUsize>,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `initialize_schema` fail.
    pub fn set_fail_schema(&self, fail: bool) {
        *self.fail_schema.lock().unwrap() = fail;
    }

    /// Make inserting the record for `file_path` fail.
    pub fn fail_insert_for(&self, file_path: impl Into<String>) {
        self.failing_inserts.lock().unwrap().insert(file_path.into());
    }

    /// Make the next `count` summary writes fail.
    pub fn fail_next_summaries(&self, count: usize) {
        self.failing_summaries.store(count, Ordering::SeqCst);
    }

    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.documents.lock().unwrap().clone()
    }

    pub fn summaries(&self) -> Vec<StoredSummary> {
        self.summaries.lock().unwrap().clone()
    }

    pub fn schema_calls(&self) -> usize {
        self.schema_calls.load(Ordering::SeqCst)
    }

    /// Summary writes attempted, including failed ones.
    pub fn summary_attempts(&self) -> usize {
        self.summary_attempts.load(Ordering::SeqCst)
    }

    fn matches(record: &DocumentRecord, filter: &DocumentFilter) -> bool {
        if let Some(ref group) = filter.source_group {
            if &record.source_group != group {
                return false;
            }
        }
        if let Some(from) = filter.published_from {
            if record.publication_date.map_or(true, |d| d < from) {
                return false;
            }
        }
        if let Some(to) = filter.published_to {
            if record.publication_date.map_or(true, |d| d > to) {
                return false;
            }
        }
        true
    }
}

impl DocumentStore for MockDocumentStore {
    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_schema.lock().unwrap() {
            return Err(StoreError::SchemaInit("injected failure".to_string()));
        }
        Ok(())
    }

    fn insert_document(&self, record: &NewDocumentRecord) -> Result<DocumentRecord, StoreError> {
        if self.failing_inserts.lock().unwrap().contains(&record.file_path) {
            return Err(StoreError::Database("injected insert failure".to_string()));
        }

        let mut documents = self.documents.lock().unwrap();
        let stored = DocumentRecord {
            id: documents.len() as i64 + 1,
            processed_at: Utc::now(),
            file_path: record.file_path.clone(),
            file_name: record.file_name.clone(),
            processing_time: record.processing_time,
            publication_date: record.publication_date,
            source_group: record.source_group.clone(),
            military_units: record.military_units.clone(),
            political_divisions: record.political_divisions.clone(),
        };
        documents.push(stored.clone());
        Ok(stored)
    }

    fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<DocumentRecord>, StoreError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|r| Self::matches(r, filter))
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    fn count_documents(&self, filter: &DocumentFilter) -> Result<i64, StoreError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|r| Self::matches(r, filter))
            .count() as i64)
    }

    fn append_summary(&self, summary: &RunSummary) -> Result<StoredSummary, StoreError> {
        self.summary_attempts.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failing_summaries.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_summaries.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Database("injected summary failure".to_string()));
        }

        let mut summaries = self.summaries.lock().unwrap();
        let stored = StoredSummary {
            id: summaries.len() as i64 + 1,
            completed_at: Utc::now(),
            summary: summary.clone(),
        };
        summaries.push(stored.clone());
        Ok(stored)
    }

    fn latest_summary(&self) -> Result<Option<StoredSummary>, StoreError> {
        Ok(self.summaries.lock().unwrap().last().cloned())
    }

    fn list_summaries(&self, limit: i64) -> Result<Vec<StoredSummary>, StoreError> {
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
