use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `PRESSROOM_PIPELINE__MAX_CONCURRENCY=2`.
const ENV_PREFIX: &str = "PRESSROOM_";

/// Legacy variable naming the archive root.
const ROOT_FOLDER_VAR: &str = "ROOT_FOLDER";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path)))
}

/// Load configuration from file if it exists, otherwise from defaults and environment.
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!("No configuration file at {:?}, using defaults", path);
    extract(Figment::from(Serialized::defaults(Config::default())))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    let mut config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    if config.scan.root_dir.is_none() {
        config.scan.root_dir = std::env::var(ROOT_FOLDER_VAR)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
    }

    Ok(config)
}
