//! Tesseract OCR based text recognizer.

use async_trait::async_trait;
use std::path::Path;

use super::command::{probe_tool, run_tool};
use super::config::ExtractionConfig;
use super::error::ExtractionError;
use super::traits::TextRecognizer;
use super::types::PageImage;

const TOOL: &str = "tesseract";

/// Recognizes page text by running `tesseract <image> stdout`.
pub struct TesseractRecognizer {
    config: ExtractionConfig,
}

impl TesseractRecognizer {
    /// Creates a new recognizer with the given configuration.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Creates a recognizer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ExtractionConfig::default())
    }

    fn build_args(&self, image: &Path) -> Vec<String> {
        let mut args = vec![
            image.to_string_lossy().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language.clone(),
        ];
        args.extend(self.config.extra_tesseract_args.iter().cloned());
        args
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        TOOL
    }

    async fn recognize(&self, page: &PageImage) -> Result<String, ExtractionError> {
        let args = self.build_args(&page.path);
        let output = run_tool(TOOL, &self.config.tesseract_path, &args, self.config.timeout_secs)
            .await?;

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        tracing::trace!(
            page = page.page_number,
            chars = text.len(),
            "Recognized page text"
        );
        Ok(text)
    }

    async fn validate(&self) -> Result<(), ExtractionError> {
        probe_tool(TOOL, &self.config.tesseract_path, "--version").await
    }
}
