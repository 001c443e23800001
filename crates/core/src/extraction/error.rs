//! Error types for the extraction module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by rasterization, recognition or tagging.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// External binary not found.
    #[error("{tool} not found at path: {path}")]
    ToolNotFound { tool: String, path: PathBuf },

    /// External binary ran but reported failure.
    #[error("{tool} failed: {reason}")]
    ToolFailed {
        tool: String,
        reason: String,
        stderr: Option<String>,
    },

    /// External binary exceeded the configured timeout.
    #[error("{tool} timed out after {timeout_secs} seconds")]
    Timeout { tool: String, timeout_secs: u64 },

    /// Input document does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Rasterization produced no page images.
    #[error("No pages rendered from {path}")]
    NoPages { path: PathBuf },

    /// Entity tagging service failed.
    #[error("Entity tagging failed: {0}")]
    Tagging(String),

    /// I/O error while preparing or reading intermediate files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Creates a tool failure with optional stderr output.
    pub fn tool_failed(
        tool: impl Into<String>,
        reason: impl Into<String>,
        stderr: Option<String>,
    ) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a tagging error.
    pub fn tagging(reason: impl Into<String>) -> Self {
        Self::Tagging(reason.into())
    }
}
