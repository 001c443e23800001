//! Extraction capabilities: page rasterization, text recognition and entity tagging.
//!
//! Each capability sits behind a trait so the document processor can be
//! exercised with mocks. The default implementations shell out to poppler's
//! `pdftoppm` and to `tesseract`, and tag entities either with a heuristic
//! chunker or an HTTP NER service.
//!
//! # Example
//!
//! ```ignore
//! use pressroom_core::extraction::{Capabilities, ExtractionConfig, TaggerConfig};
//!
//! let capabilities = Capabilities::from_config(
//!     &ExtractionConfig::default(),
//!     &TaggerConfig::default(),
//! )?;
//!
//! for (name, err) in capabilities.validate().await {
//!     tracing::warn!("{} unavailable: {}", name, err);
//! }
//!
//! let pages = capabilities.rasterizer.rasterize(Path::new("/archive/doc.pdf")).await?;
//! for page in pages.pages() {
//!     let text = capabilities.recognizer.recognize(page).await?;
//! }
//! ```

mod command;
mod config;
mod error;
mod pdftoppm;
mod tagger;
mod tesseract;
mod traits;
mod types;

use std::sync::Arc;

pub use config::{ExtractionConfig, TaggerBackend, TaggerConfig};
pub use error::ExtractionError;
pub use pdftoppm::PdftoppmRasterizer;
pub use tagger::{HeuristicTagger, HttpEntityTagger};
pub use tesseract::TesseractRecognizer;
pub use traits::{EntityTagger, Rasterizer, TextRecognizer};
pub use types::{PageImage, PageSet};

/// Long-lived extraction engines, built once at startup and shared by every worker.
#[derive(Clone)]
pub struct Capabilities {
    pub rasterizer: Arc<dyn Rasterizer>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub tagger: Arc<dyn EntityTagger>,
}

impl Capabilities {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn TextRecognizer>,
        tagger: Arc<dyn EntityTagger>,
    ) -> Self {
        Self {
            rasterizer,
            recognizer,
            tagger,
        }
    }

    /// Builds the tool-backed capabilities described by configuration.
    pub fn from_config(
        extraction: &ExtractionConfig,
        tagger: &TaggerConfig,
    ) -> Result<Self, ExtractionError> {
        let entity_tagger: Arc<dyn EntityTagger> = match tagger.backend {
            TaggerBackend::Heuristic => Arc::new(HeuristicTagger::new()),
            TaggerBackend::Http => Arc::new(HttpEntityTagger::new(tagger)?),
        };

        Ok(Self {
            rasterizer: Arc::new(PdftoppmRasterizer::new(extraction.clone())),
            recognizer: Arc::new(TesseractRecognizer::new(extraction.clone())),
            tagger: entity_tagger,
        })
    }

    /// Checks every capability, returning the ones that are not ready.
    pub async fn validate(&self) -> Vec<(String, ExtractionError)> {
        let mut problems = Vec::new();

        if let Err(e) = self.rasterizer.validate().await {
            problems.push((self.rasterizer.name().to_string(), e));
        }
        if let Err(e) = self.recognizer.validate().await {
            problems.push((self.recognizer.name().to_string(), e));
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_default_config() {
        let caps =
            Capabilities::from_config(&ExtractionConfig::default(), &TaggerConfig::default())
                .unwrap();
        assert_eq!(caps.rasterizer.name(), "pdftoppm");
        assert_eq!(caps.recognizer.name(), "tesseract");
        assert_eq!(caps.tagger.name(), "heuristic");
    }

    #[test]
    fn test_http_backend_without_url_fails() {
        let tagger = TaggerConfig {
            backend: TaggerBackend::Http,
            ..Default::default()
        };
        assert!(Capabilities::from_config(&ExtractionConfig::default(), &tagger).is_err());
    }

    #[tokio::test]
    async fn test_validate_reports_missing_tools() {
        let extraction = ExtractionConfig {
            pdftoppm_path: PathBuf::from("/nonexistent/pdftoppm"),
            tesseract_path: PathBuf::from("/nonexistent/tesseract"),
            ..Default::default()
        };
        let caps = Capabilities::from_config(&extraction, &TaggerConfig::default()).unwrap();

        let problems = caps.validate().await;
        let names: Vec<&str> = problems.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["pdftoppm", "tesseract"]);
    }
}
