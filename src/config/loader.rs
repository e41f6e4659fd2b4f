//! Configuration structures and loading logic.

use crate::config::modes::OutputFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Lowest episode number to download (inclusive).
    #[serde(default)]
    pub min_episode: u32,

    /// Highest episode number to download (inclusive).
    #[serde(default = "default_max_episode")]
    pub max_episode: u32,

    /// Number of episodes written into each output file.
    #[serde(default = "default_episodes_per_file")]
    pub episodes_per_file: usize,

    /// Output file format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Maximum batches saved concurrently for one series.
    #[serde(default = "default_episode_concurrency")]
    pub episode_concurrency: usize,

    /// Maximum series processed concurrently in database mode.
    #[serde(default = "default_series_concurrency")]
    pub series_concurrency: usize,

    /// Run every stored series at once, ignoring `series_concurrency`.
    #[serde(default)]
    pub max_series_concurrency: bool,

    /// Skip batches whose output file already exists.
    #[serde(default)]
    pub skip_existing: bool,

    /// Milliseconds to wait after every page fetch.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Path to the SQLite progress database.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Whether to show progress bars and per-file messages.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            min_episode: 0,
            max_episode: default_max_episode(),
            episodes_per_file: default_episodes_per_file(),
            format: OutputFormat::default(),
            episode_concurrency: default_episode_concurrency(),
            series_concurrency: default_series_concurrency(),
            max_series_concurrency: false,
            skip_existing: false,
            request_delay_ms: default_request_delay(),
            database_path: default_database_path(),
            show_progress: true,
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Referer header sent with every image request. The image CDN rejects
    /// requests without it.
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            referer: default_referer(),
        }
    }
}

fn default_max_episode() -> u32 {
    u32::MAX
}

fn default_episodes_per_file() -> usize {
    1
}

fn default_episode_concurrency() -> usize {
    10
}

fn default_series_concurrency() -> usize {
    2
}

fn default_request_delay() -> u64 {
    200
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.db")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36".to_string()
}

fn default_referer() -> String {
    "http://www.webtoons.com".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
