//! Persistence gateway for document records and run summaries.
//!
//! The store is synchronous; async callers run it on the blocking pool.
//! `SqliteDocumentStore` keeps a single connection behind a mutex, so each
//! statement runs with exclusive access and the guard is released on every
//! exit path.

mod sqlite;
mod types;

pub use sqlite::SqliteDocumentStore;
pub use types::{
    DocumentFilter, DocumentRecord, NewDocumentRecord, RunSummary, StoreError, StoredSummary,
};

/// Durable storage for processed documents and run summaries.
pub trait DocumentStore: Send + Sync {
    /// Creates the tables if they do not exist. Safe to call repeatedly.
    fn initialize_schema(&self) -> Result<(), StoreError>;

    /// Writes one document record and returns it with its assigned id.
    fn insert_document(&self, record: &NewDocumentRecord) -> Result<DocumentRecord, StoreError>;

    /// Lists document records matching the filter, oldest first.
    fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<DocumentRecord>, StoreError>;

    /// Counts document records matching the filter, ignoring limit and offset.
    fn count_documents(&self, filter: &DocumentFilter) -> Result<i64, StoreError>;

    /// Appends a run summary. Summaries are never updated in place.
    fn append_summary(&self, summary: &RunSummary) -> Result<StoredSummary, StoreError>;

    /// Returns the most recently appended summary.
    fn latest_summary(&self) -> Result<Option<StoredSummary>, StoreError>;

    /// Returns up to `limit` summaries, newest first.
    fn list_summaries(&self, limit: i64) -> Result<Vec<StoredSummary>, StoreError>;
}
