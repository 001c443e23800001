use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::classifier::ClassifierConfig;
use crate::extraction::{ExtractionConfig, TaggerBackend, TaggerConfig};
use crate::pipeline::PipelineConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub tagger: TaggerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file. `:memory:` keeps everything in process.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the store should live only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("pressroom.db")
}

/// What to scan and which files qualify.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Root directory of the archive. Falls back to `ROOT_FOLDER` when unset.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// Case-sensitive file name suffix of eligible documents.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            extension: default_extension(),
        }
    }
}

fn default_extension() -> String {
    ".pdf".to_string()
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scan: ScanConfig,
    pub pipeline: PipelineConfig,
    pub extraction: ExtractionConfig,
    pub tagger: SanitizedTaggerConfig,
}

/// Tagger config without the service URL, which may embed credentials.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTaggerConfig {
    pub backend: String,
    pub url_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            scan: config.scan.clone(),
            pipeline: config.pipeline.clone(),
            extraction: config.extraction.clone(),
            tagger: SanitizedTaggerConfig {
                backend: match config.tagger.backend {
                    TaggerBackend::Heuristic => "heuristic".to_string(),
                    TaggerBackend::Http => "http".to_string(),
                },
                url_configured: config.tagger.url.is_some(),
            },
        }
    }
}
