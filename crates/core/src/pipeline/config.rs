//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};

/// Configuration for pipeline runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on concurrently processed documents.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Seconds to wait for in-flight documents after cancellation.
    #[serde(default = "default_cancel_grace")]
    pub cancel_grace_secs: u64,

    /// Only persist and count documents whose publication date was derived.
    #[serde(default = "default_true")]
    pub require_publication_date: bool,

    /// Run entity tagging and classification.
    #[serde(default = "default_true")]
    pub classify_entities: bool,

    /// Retry policy for the run summary write.
    #[serde(default)]
    pub summary_retry: RetryConfig,
}

/// Retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub delay_ms: u64,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_cancel_grace() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            cancel_grace_secs: default_cancel_grace(),
            require_publication_date: true,
            classify_entities: true,
            summary_retry: RetryConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Sets the maximum concurrency.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Sets the cancellation grace period.
    pub fn with_cancel_grace_secs(mut self, secs: u64) -> Self {
        self.cancel_grace_secs = secs;
        self
    }

    /// Sets whether a publication date is required for persistence.
    pub fn with_require_publication_date(mut self, required: bool) -> Self {
        self.require_publication_date = required;
        self
    }

    /// Sets the summary retry policy.
    pub fn with_summary_retry(mut self, max_attempts: u32, delay_ms: u64) -> Self {
        self.summary_retry = RetryConfig {
            max_attempts,
            delay_ms,
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.cancel_grace_secs, 30);
        assert!(config.require_publication_date);
        assert!(config.classify_entities);
        assert_eq!(config.summary_retry.max_attempts, 3);
        assert_eq!(config.summary_retry.delay_ms, 500);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PipelineConfig = toml::from_str("max_concurrency = 8").unwrap();
        assert_eq!(config.max_concurrency, 8);
        assert!(config.require_publication_date);
        assert_eq!(config.summary_retry.max_attempts, 3);
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::default()
            .with_max_concurrency(2)
            .with_cancel_grace_secs(1)
            .with_require_publication_date(false)
            .with_summary_retry(5, 10);

        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.cancel_grace_secs, 1);
        assert!(!config.require_publication_date);
        assert_eq!(config.summary_retry.max_attempts, 5);
    }
}
