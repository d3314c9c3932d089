//! Configuration types for yt-converter

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf};
use utoipa::ToSchema;

/// Download behavior configuration (output directory, job retention)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Output directory (default: "~/Downloads/Youtube Converter")
    #[serde(default = "crate::paths::default_download_dir")]
    #[schema(value_type = String)]
    pub download_dir: PathBuf,

    /// Number of finished jobs kept in memory for `GET /jobs` (default: 100)
    ///
    /// The oldest finished job is evicted first. Nothing is persisted.
    #[serde(default = "default_max_finished_jobs")]
    pub max_finished_jobs: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: crate::paths::default_download_dir(),
            max_finished_jobs: default_max_finished_jobs(),
        }
    }
}

/// External tool configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Codec passed to `--audio-format` for mp3 jobs (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            audio_format: default_audio_format(),
        }
    }
}

/// Main configuration for the converter
///
/// Fields are organized into sub-configs:
/// - [`download`](DownloadConfig) - output directory, job retention
/// - [`tools`](ToolsConfig) - external binary location
/// - [`server`](ServerIntegrationConfig) - HTTP API
///
/// `download` and `tools` are flattened, so a JSON config file stays flat:
///
/// ```json
/// { "download_dir": "/srv/media", "ytdlp_path": "/usr/local/bin/yt-dlp",
///   "api": { "bind_address": "0.0.0.0:5000" } }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool settings
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// API server settings
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load configuration from a JSON file
    ///
    /// Missing fields take their defaults, so an empty object is a valid file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file '{}': {}", path.display(), e),
            key: None,
        })?;

        serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("invalid config file '{}': {}", path.display(), e),
            key: None,
        })
    }

    /// Override the API bind address from a string such as `0.0.0.0:5000`
    pub fn set_bind_address(&mut self, address: &str) -> Result<()> {
        self.server.api.bind_address = address.parse().map_err(|e| Error::Config {
            message: format!("invalid bind address '{}': {}", address, e),
            key: Some("bind_address".to_string()),
        })?;
        Ok(())
    }
}

/// Server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Capacity of the event broadcast channel (default: 1000)
    ///
    /// A subscriber that falls further behind than this skips events.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_audio_format() -> String {
    "mp3".into()
}

fn default_max_finished_jobs() -> usize {
    100
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_event_buffer() -> usize {
    1000
}
