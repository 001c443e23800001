//! Poppler `pdftoppm` based rasterizer.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::command::{probe_tool, run_tool};
use super::config::ExtractionConfig;
use super::error::ExtractionError;
use super::traits::Rasterizer;
use super::types::{PageImage, PageSet};

const TOOL: &str = "pdftoppm";

/// Output file prefix inside the scratch directory.
const PAGE_PREFIX: &str = "page";

/// Renders PDF pages to PNG files with `pdftoppm`.
pub struct PdftoppmRasterizer {
    config: ExtractionConfig,
}

impl PdftoppmRasterizer {
    /// Creates a new rasterizer with the given configuration.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Creates a rasterizer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ExtractionConfig::default())
    }

    fn build_args(&self, input: &Path, output_prefix: &Path) -> Vec<String> {
        vec![
            "-r".to_string(),
            self.config.dpi.to_string(),
            "-png".to_string(),
            input.to_string_lossy().to_string(),
            output_prefix.to_string_lossy().to_string(),
        ]
    }

    async fn collect_pages(dir: &Path) -> Result<Vec<PageImage>, ExtractionError> {
        let mut pages = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(page_number) = parse_page_number(&name) {
                pages.push(PageImage {
                    page_number,
                    path: entry.path(),
                });
            }
        }

        Ok(pages)
    }
}

#[async_trait]
impl Rasterizer for PdftoppmRasterizer {
    fn name(&self) -> &str {
        TOOL
    }

    async fn rasterize(&self, path: &Path) -> Result<PageSet, ExtractionError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ExtractionError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let scratch_dir: PathBuf = self
            .config
            .temp_dir
            .join(uuid::Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&scratch_dir).await?;

        // From here on the page set owns the directory, including on error.
        let mut page_set = PageSet::with_scratch_dir(Vec::new(), scratch_dir.clone());

        let args = self.build_args(path, &scratch_dir.join(PAGE_PREFIX));
        tracing::debug!("Running pdftoppm with args: {:?}", args);
        run_tool(TOOL, &self.config.pdftoppm_path, &args, self.config.timeout_secs).await?;

        let pages = Self::collect_pages(&scratch_dir).await?;
        if pages.is_empty() {
            return Err(ExtractionError::NoPages {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(pages = pages.len(), "Rendered {:?}", path);
        page_set.replace_pages(pages);
        Ok(page_set)
    }

    async fn validate(&self) -> Result<(), ExtractionError> {
        probe_tool(TOOL, &self.config.pdftoppm_path, "-v").await
    }
}

/// Parses `page-7.png` / `page-007.png` into 7.
fn parse_page_number(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(PAGE_PREFIX)?
        .strip_prefix('-')?
        .strip_suffix(".png")?
        .parse()
        .ok()
}
