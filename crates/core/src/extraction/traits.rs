//! Trait definitions for the extraction module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ExtractionError;
use super::types::{PageImage, PageSet};
use crate::classifier::TaggedEntity;

/// Renders a document into ordered page images.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Returns the name of this rasterizer implementation.
    fn name(&self) -> &str;

    /// Renders every page of the document at `path`.
    async fn rasterize(&self, path: &Path) -> Result<PageSet, ExtractionError>;

    /// Validates that the rasterizer is properly configured and ready.
    async fn validate(&self) -> Result<(), ExtractionError> {
        Ok(())
    }
}

/// Recognizes the text on a page image.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Returns the name of this recognizer implementation.
    fn name(&self) -> &str;

    /// Returns the text found on `page`.
    async fn recognize(&self, page: &PageImage) -> Result<String, ExtractionError>;

    /// Validates that the recognizer is properly configured and ready.
    async fn validate(&self) -> Result<(), ExtractionError> {
        Ok(())
    }
}

/// Finds named phrases in text and tags each with a broad kind.
#[async_trait]
pub trait EntityTagger: Send + Sync {
    /// Returns the name of this tagger implementation.
    fn name(&self) -> &str;

    /// Tags named phrases in `text`, in order of appearance.
    async fn tag(&self, text: &str) -> Result<Vec<TaggedEntity>, ExtractionError>;
}
