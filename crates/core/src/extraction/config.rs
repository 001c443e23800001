//! Configuration for the extraction module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the external rasterization and recognition tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Path to the pdftoppm binary (poppler-utils).
    #[serde(default = "default_pdftoppm_path")]
    pub pdftoppm_path: PathBuf,

    /// Path to the tesseract binary.
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: PathBuf,

    /// Rendering resolution in dots per inch.
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Tesseract language code(s), e.g. "spa" or "spa+eng".
    #[serde(default = "default_language")]
    pub language: String,

    /// Timeout for a single tool invocation in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Scratch directory for rendered page images.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Additional tesseract arguments (e.g. ["--psm", "3"]).
    #[serde(default)]
    pub extra_tesseract_args: Vec<String>,
}

fn default_pdftoppm_path() -> PathBuf {
    PathBuf::from("pdftoppm")
}

fn default_tesseract_path() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_dpi() -> u32 {
    200
}

fn default_language() -> String {
    "spa".to_string()
}

fn default_timeout() -> u64 {
    600 // 10 minutes
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("pressroom-pages")
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pdftoppm_path: default_pdftoppm_path(),
            tesseract_path: default_tesseract_path(),
            dpi: default_dpi(),
            language: default_language(),
            timeout_secs: default_timeout(),
            temp_dir: default_temp_dir(),
            extra_tesseract_args: Vec::new(),
        }
    }
}

/// Available entity tagging backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaggerBackend {
    /// Capitalized-phrase chunker, no external service.
    #[default]
    Heuristic,
    /// NER service reached over HTTP.
    Http,
}

/// Entity tagger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggerConfig {
    #[serde(default)]
    pub backend: TaggerBackend,

    /// NER endpoint (required when backend = "http").
    #[serde(default)]
    pub url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_tagger_timeout")]
    pub timeout_secs: u64,
}

fn default_tagger_timeout() -> u64 {
    60
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            backend: TaggerBackend::default(),
            url: None,
            timeout_secs: default_tagger_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert_eq!(config.pdftoppm_path, PathBuf::from("pdftoppm"));
        assert_eq!(config.tesseract_path, PathBuf::from("tesseract"));
        assert_eq!(config.dpi, 200);
        assert_eq!(config.language, "spa");
        assert!(config.extra_tesseract_args.is_empty());
    }

    #[test]
    fn test_default_tagger() {
        let config = TaggerConfig::default();
        assert_eq!(config.backend, TaggerBackend::Heuristic);
        assert!(config.url.is_none());
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_deserialize_tagger() {
        let toml = r#"
            backend = "http"
            url = "http://localhost:5005/ents"
        "#;
        let config: TaggerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.backend, TaggerBackend::Http);
        assert_eq!(config.url.as_deref(), Some("http://localhost:5005/ents"));
    }
}
