//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the full router in
//! process, backed by an in-memory store and mock extraction tools, so the
//! HTTP surface can be exercised without pdftoppm or tesseract installed.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use pressroom_core::{
    testing::fixtures::{self, MockCapabilities},
    Config, DocumentStore, NewDocumentRecord, PipelineCoordinator, SqliteDocumentStore,
};
use pressroom_server::{create_router, AppState};

/// Test fixture wiring the router to mocks.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state, for inspecting the coordinator and last run
    pub state: Arc<AppState>,
    /// Store behind the API, for seeding records
    pub store: Arc<dyn DocumentStore>,
    /// Mock extraction tools
    pub mocks: MockCapabilities,
    /// Archive root configured as `scan.root_dir`
    pub root: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture whose scan root is an empty temporary directory.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create archive root");
        let mut config = Config::default();
        config.scan.root_dir = Some(root.path().to_path_buf());
        Self::build(config, root)
    }

    /// Create a fixture with no scan root configured.
    pub fn without_root() -> Self {
        let root = TempDir::new().expect("Failed to create archive root");
        let mut config = Config::default();
        config.scan.root_dir = None;
        Self::build(config, root)
    }

    fn build(mut config: Config, root: TempDir) -> Self {
        config.database.path = PathBuf::from(":memory:");
        config.pipeline.max_concurrency = 2;

        let store: Arc<dyn DocumentStore> =
            Arc::new(SqliteDocumentStore::in_memory().expect("Failed to open store"));
        store.initialize_schema().expect("Failed to create schema");

        let mocks = fixtures::mock_capabilities();
        let coordinator = Arc::new(PipelineCoordinator::from_config(
            &config,
            mocks.capabilities.clone(),
            Arc::clone(&store),
        ));

        let state = Arc::new(AppState::new(config, Arc::clone(&store), coordinator));
        let router = create_router(Arc::clone(&state));

        Self {
            router,
            state,
            store,
            mocks,
            root,
        }
    }

    /// Write placeholder documents under the archive root.
    pub fn write_documents(&self, relative_paths: &[&str]) -> Vec<PathBuf> {
        fixtures::write_documents(self.root.path(), relative_paths)
    }

    /// Insert a record directly into the store.
    pub fn seed(&self, record: NewDocumentRecord) {
        self.store
            .insert_document(&record)
            .expect("Failed to seed record");
    }

    /// Wait until the background run has finished and its outcome is recorded.
    pub async fn wait_for_run(&self) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            if !self.state.coordinator().is_running() && self.state.last_run().await.is_some() {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "Background run did not finish in time"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    /// Send a request to the test router.
    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// A record with the given group and publication date.
pub fn record(file_name: &str, source_group: &str, date: Option<&str>) -> NewDocumentRecord {
    NewDocumentRecord {
        file_path: format!("/archive/{}/{}", source_group, file_name),
        file_name: file_name.to_string(),
        processing_time: 1.5,
        publication_date: date.map(|d| {
            chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").expect("valid test date")
        }),
        source_group: source_group.to_string(),
        military_units: vec!["3rd Battalion".to_string()],
        political_divisions: Vec::new(),
    }
}
