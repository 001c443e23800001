//! Mock extraction capabilities for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::classifier::TaggedEntity;
use crate::extraction::{
    EntityTagger, ExtractionError, PageImage, PageSet, Rasterizer, TextRecognizer,
};

/// Mock implementation of the Rasterizer trait.
///
/// Provides controllable behavior for testing:
/// - Page count for every document
/// - Failure for chosen paths
/// - Artificial delay per document
/// - A high-water mark of concurrent calls
///
/// # Example
///
/// ```rust,ignore
/// use pressroom_core::testing::MockRasterizer;
///
/// let rasterizer = MockRasterizer::new();
/// rasterizer.set_default_pages(3);
/// rasterizer.set_delay(Duration::from_millis(50));
/// rasterizer.fail_path("/archive/corrupt.pdf");
///
/// // ... run the pipeline ...
///
/// assert!(rasterizer.max_in_flight() <= 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRasterizer {
    default_pages: Arc<AtomicUsize>,
    failing_paths: Arc<Mutex<HashSet<PathBuf>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    started: Arc<Mutex<Vec<PathBuf>>>,
}

/// Decrements the in-flight counter even when the call is aborted.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockRasterizer {
    /// Create a new mock rasterizer producing one page per document.
    pub fn new() -> Self {
        let mock = Self::default();
        mock.default_pages.store(1, Ordering::SeqCst);
        mock
    }

    /// Set the number of pages rendered for every document.
    pub fn set_default_pages(&self, pages: usize) {
        self.default_pages.store(pages, Ordering::SeqCst);
    }

    /// Make rasterization fail for `path`.
    pub fn fail_path(&self, path: impl Into<PathBuf>) {
        self.failing_paths.lock().unwrap().insert(path.into());
    }

    /// Sleep for `delay` inside every call.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Highest number of calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Calls currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Paths whose rasterization has started, in call order.
    pub fn started_paths(&self) -> Vec<PathBuf> {
        self.started.lock().unwrap().clone()
    }

    pub fn started_count(&self) -> usize {
        self.started.lock().unwrap().len()
    }
}

#[async_trait]
impl Rasterizer for MockRasterizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn rasterize(&self, path: &Path) -> Result<PageSet, ExtractionError> {
        self.started.lock().unwrap().push(path.to_path_buf());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_paths.lock().unwrap().contains(path) {
            return Err(ExtractionError::tool_failed(
                "mock",
                "corrupt document",
                None,
            ));
        }

        let pages = (1..=self.default_pages.load(Ordering::SeqCst))
            .map(|n| PageImage {
                page_number: n,
                path: PathBuf::from(format!("{}-page-{}.png", path.display(), n)),
            })
            .collect();
        Ok(PageSet::new(pages))
    }
}

/// Mock implementation of the TextRecognizer trait.
///
/// Page `n` is recognized as `"page n text"` unless a fixed text is set.
#[derive(Debug, Clone, Default)]
pub struct MockRecognizer {
    text: Arc<Mutex<Option<String>>>,
    fail_on_page: Arc<Mutex<Option<usize>>>,
    recognized: Arc<AtomicUsize>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `text` for every page.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock().unwrap() = Some(text.into());
    }

    /// Fail when recognizing page number `page`.
    pub fn fail_on_page(&self, page: usize) {
        *self.fail_on_page.lock().unwrap() = Some(page);
    }

    /// Number of pages successfully recognized.
    pub fn recognized_count(&self) -> usize {
        self.recognized.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRecognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(&self, page: &PageImage) -> Result<String, ExtractionError> {
        if *self.fail_on_page.lock().unwrap() == Some(page.page_number) {
            return Err(ExtractionError::tool_failed(
                "mock",
                "unreadable page",
                None,
            ));
        }

        self.recognized.fetch_add(1, Ordering::SeqCst);
        let text = self.text.lock().unwrap().clone();
        Ok(text.unwrap_or_else(|| format!("page {} text", page.page_number)))
    }
}

/// Mock implementation of the EntityTagger trait.
///
/// Returns a fixed entity list and records every text it was given.
#[derive(Debug, Clone, Default)]
pub struct MockTagger {
    entities: Arc<Mutex<Vec<TaggedEntity>>>,
    failing: Arc<Mutex<bool>>,
    received: Arc<Mutex<Vec<String>>>,
}

impl MockTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entities returned for every text.
    pub fn set_entities(&self, entities: Vec<TaggedEntity>) {
        *self.entities.lock().unwrap() = entities;
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Texts passed to `tag`, in call order.
    pub fn received_texts(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntityTagger for MockTagger {
    fn name(&self) -> &str {
        "mock"
    }

    async fn tag(&self, text: &str) -> Result<Vec<TaggedEntity>, ExtractionError> {
        self.received.lock().unwrap().push(text.to_string());
        if *self.failing.lock().unwrap() {
            return Err(ExtractionError::tagging("service unavailable"));
        }
        Ok(self.entities.lock().unwrap().clone())
    }
}
