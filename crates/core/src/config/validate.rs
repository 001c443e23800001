use super::{types::Config, ConfigError};
use crate::extraction::TaggerBackend;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Pipeline concurrency is at least 1
/// - A failed summary write is retried at least once
/// - Scan extension is not empty
/// - Rasterization DPI is positive
/// - The HTTP tagger has a URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.pipeline.max_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.max_concurrency must be at least 1".to_string(),
        ));
    }

    if config.pipeline.summary_retry.max_attempts < 2 {
        return Err(ConfigError::ValidationError(
            "pipeline.summary_retry.max_attempts must be at least 2".to_string(),
        ));
    }

    if config.scan.extension.is_empty() {
        return Err(ConfigError::ValidationError(
            "scan.extension cannot be empty".to_string(),
        ));
    }

    if config.extraction.dpi == 0 {
        return Err(ConfigError::ValidationError(
            "extraction.dpi must be positive".to_string(),
        ));
    }

    if config.tagger.backend == TaggerBackend::Http && config.tagger.url.is_none() {
        return Err(ConfigError::ValidationError(
            "tagger.url is required when tagger.backend = \"http\"".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = Config::default();
        config.pipeline.max_concurrency = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_summary_write_must_retry() {
        let mut config = Config::default();
        config.pipeline.summary_retry.max_attempts = 1;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));

        config.pipeline.summary_retry.max_attempts = 2;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_extension_fails() {
        let mut config = Config::default();
        config.scan.extension = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_http_tagger_requires_url() {
        let mut config = Config::default();
        config.tagger.backend = TaggerBackend::Http;
        assert!(validate_config(&config).is_err());

        config.tagger.url = Some("http://localhost:5005/ents".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
