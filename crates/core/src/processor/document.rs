//! Document processor implementation.

use std::time::Instant;
use tracing::debug;

use crate::classifier::{Classifier, EntityCategories};
use crate::extraction::Capabilities;
use crate::metadata::DocumentMetadata;

use super::types::{FailureKind, ItemResult, ProcessingFailure, ProcessingOutcome, WorkItem};

/// Turns one document into a [`ProcessingOutcome`] or a [`ProcessingFailure`].
///
/// The processor performs no persistence; it only calls the extraction
/// capabilities and reports what it found. Failures of any external step are
/// returned as values and never escape as errors.
#[derive(Clone)]
pub struct DocumentProcessor {
    capabilities: Capabilities,
    classifier: Classifier,
    classify_entities: bool,
}

impl DocumentProcessor {
    /// Creates a processor that tags and classifies entities.
    pub fn new(capabilities: Capabilities, classifier: Classifier) -> Self {
        Self {
            capabilities,
            classifier,
            classify_entities: true,
        }
    }

    /// Enables or disables the tagging and classification stage.
    pub fn with_classification(mut self, enabled: bool) -> Self {
        self.classify_entities = enabled;
        self
    }

    /// Processes one work item.
    pub async fn process(&self, item: &WorkItem) -> ItemResult {
        let start = Instant::now();
        let path = item.path();
        let metadata = DocumentMetadata::from_path(path);

        let pages = self
            .capabilities
            .rasterizer
            .rasterize(path)
            .await
            .map_err(|e| ProcessingFailure::new(path, FailureKind::Rasterization, e.to_string()))?;

        let mut texts = Vec::with_capacity(pages.len());
        for page in pages.pages() {
            let text = self.capabilities.recognizer.recognize(page).await.map_err(|e| {
                ProcessingFailure::new(
                    path,
                    FailureKind::Recognition,
                    format!("page {}: {}", page.page_number, e),
                )
            })?;
            texts.push(text);
        }
        let page_count = texts.len();
        let full_text = texts.join(" ");

        let categories = if self.classify_entities {
            let entities = self
                .capabilities
                .tagger
                .tag(&full_text)
                .await
                .map_err(|e| ProcessingFailure::new(path, FailureKind::Tagging, e.to_string()))?;
            self.classifier.classify(&entities)
        } else {
            EntityCategories::default()
        };

        let elapsed = start.elapsed();
        debug!(
            path = %path.display(),
            pages = page_count,
            units = categories.military_units.len(),
            divisions = categories.political_divisions.len(),
            "Processed document in {:.2}s",
            elapsed.as_secs_f64()
        );

        Ok(ProcessingOutcome {
            path: path.to_path_buf(),
            file_name: metadata.file_name,
            source_group: metadata.source_group,
            publication_date: metadata.publication_date,
            elapsed,
            page_count,
            military_units: categories.military_units,
            political_divisions: categories.political_divisions,
        })
    }
}
