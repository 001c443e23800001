//! SQLite-backed document store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    DocumentFilter, DocumentRecord, DocumentStore, NewDocumentRecord, RunSummary, StoreError,
    StoredSummary,
};

const DOCUMENT_COLUMNS: &str = "id, processed_at, file_path, file_name, processing_time, \
     publication_date, source_group, military_units, political_divisions";

const SUMMARY_COLUMNS: &str = "id, completed_at, total_processing_time, total_files_processed, \
     failed_files, skipped_files, cancelled";

/// SQLite-backed document store.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Opens (or creates) the database file at `path`.
    ///
    /// Tables are not created here; call [`DocumentStore::initialize_schema`].
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Database(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens `path`, treating `:memory:` as an in-memory database.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if path.as_os_str() == ":memory:" {
            Self::in_memory()
        } else {
            Self::new(path)
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))
    }

    fn build_where_clause(filter: &DocumentFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref group) = filter.source_group {
            conditions.push("source_group = ?");
            params.push(Box::new(group.clone()));
        }
        if let Some(from) = filter.published_from {
            conditions.push("publication_date >= ?");
            params.push(Box::new(from.to_string()));
        }
        if let Some(to) = filter.published_to {
            conditions.push("publication_date <= ?");
            params.push(Box::new(to.to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<DocumentRecord> {
        let processed_at: String = row.get(1)?;
        let publication_date: Option<String> = row.get(5)?;
        let units_json: String = row.get(7)?;
        let divisions_json: String = row.get(8)?;

        Ok(DocumentRecord {
            id: row.get(0)?,
            processed_at: parse_timestamp(&processed_at),
            file_path: row.get(2)?,
            file_name: row.get(3)?,
            processing_time: row.get(4)?,
            publication_date: publication_date
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            source_group: row.get(6)?,
            military_units: serde_json::from_str(&units_json).unwrap_or_default(),
            political_divisions: serde_json::from_str(&divisions_json).unwrap_or_default(),
        })
    }

    fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<StoredSummary> {
        let completed_at: String = row.get(1)?;
        Ok(StoredSummary {
            id: row.get(0)?,
            completed_at: parse_timestamp(&completed_at),
            summary: RunSummary {
                total_processing_time: row.get(2)?,
                total_files_processed: row.get::<_, i64>(3)?.max(0) as u64,
                failed_files: row.get::<_, i64>(4)?.max(0) as u64,
                skipped_files: row.get::<_, i64>(5)?.max(0) as u64,
                cancelled: row.get(6)?,
            },
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl DocumentStore for SqliteDocumentStore {
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS processed_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                processed_at TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_name TEXT NOT NULL,
                processing_time REAL NOT NULL,
                publication_date TEXT,
                source_group TEXT NOT NULL,
                military_units TEXT NOT NULL DEFAULT '[]',
                political_divisions TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_processed_files_source_group
                ON processed_files(source_group);
            CREATE INDEX IF NOT EXISTS idx_processed_files_publication_date
                ON processed_files(publication_date);

            CREATE TABLE IF NOT EXISTS processing_summary (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                completed_at TEXT NOT NULL,
                total_processing_time REAL NOT NULL,
                total_files_processed INTEGER NOT NULL,
                failed_files INTEGER NOT NULL DEFAULT 0,
                skipped_files INTEGER NOT NULL DEFAULT 0,
                cancelled INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .map_err(|e| StoreError::SchemaInit(e.to_string()))
    }

    fn insert_document(&self, record: &NewDocumentRecord) -> Result<DocumentRecord, StoreError> {
        let units_json = serde_json::to_string(&record.military_units)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let divisions_json = serde_json::to_string(&record.political_divisions)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let now = Utc::now();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO processed_files (processed_at, file_path, file_name, processing_time, publication_date, source_group, military_units, political_divisions) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                now.to_rfc3339(),
                record.file_path,
                record.file_name,
                record.processing_time,
                record.publication_date.map(|d| d.to_string()),
                record.source_group,
                units_json,
                divisions_json,
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        let id = conn.last_insert_rowid();

        Ok(DocumentRecord {
            id,
            processed_at: now,
            file_path: record.file_path.clone(),
            file_name: record.file_name.clone(),
            processing_time: record.processing_time,
            publication_date: record.publication_date,
            source_group: record.source_group.clone(),
            military_units: record.military_units.clone(),
            political_divisions: record.political_divisions.clone(),
        })
    }

    fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<DocumentRecord>, StoreError> {
        let (where_clause, mut params) = Self::build_where_clause(filter);
        let sql = format!(
            "SELECT {} FROM processed_files {} ORDER BY id ASC LIMIT ? OFFSET ?",
            DOCUMENT_COLUMNS, where_clause
        );
        params.push(Box::new(filter.limit));
        params.push(Box::new(filter.offset));

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_document)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn count_documents(&self, filter: &DocumentFilter) -> Result<i64, StoreError> {
        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM processed_files {}", where_clause);

        let conn = self.lock()?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn append_summary(&self, summary: &RunSummary) -> Result<StoredSummary, StoreError> {
        let now = Utc::now();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO processing_summary (completed_at, total_processing_time, total_files_processed, failed_files, skipped_files, cancelled) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                now.to_rfc3339(),
                summary.total_processing_time,
                summary.total_files_processed as i64,
                summary.failed_files as i64,
                summary.skipped_files as i64,
                summary.cancelled,
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(StoredSummary {
            id: conn.last_insert_rowid(),
            completed_at: now,
            summary: summary.clone(),
        })
    }

    fn latest_summary(&self) -> Result<Option<StoredSummary>, StoreError> {
        let sql = format!(
            "SELECT {} FROM processing_summary ORDER BY id DESC LIMIT 1",
            SUMMARY_COLUMNS
        );
        let conn = self.lock()?;
        conn.query_row(&sql, [], Self::row_to_summary)
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn list_summaries(&self, limit: i64) -> Result<Vec<StoredSummary>, StoreError> {
        let sql = format!(
            "SELECT {} FROM processing_summary ORDER BY id DESC LIMIT ?",
            SUMMARY_COLUMNS
        );
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit], Self::row_to_summary)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
