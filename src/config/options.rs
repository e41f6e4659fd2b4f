//! Immutable per-run download options.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::loader::Config;
use crate::config::modes::OutputFormat;

/// Everything a series run needs to know, fixed before the run starts.
///
/// Built once from the merged [`Config`] and shared read-only (usually behind
/// an `Arc`) by the crawler, the planner and the batch workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Series listing URL or single-episode viewer URL.
    pub series_url: String,
    pub min_episode: u32,
    pub max_episode: u32,
    pub episodes_per_file: usize,
    pub format: OutputFormat,
    pub episode_concurrency: usize,
    pub skip_existing: bool,
    /// Delay after every listing or episode page fetch.
    pub request_delay: Duration,
    pub download_directory: PathBuf,
    pub referer: String,
    pub show_progress: bool,
}

impl DownloadOptions {
    /// Build options for one series from the merged configuration.
    pub fn from_config(config: &Config, series_url: impl Into<String>) -> Self {
        let options = &config.options;
        Self {
            series_url: series_url.into(),
            min_episode: options.min_episode,
            max_episode: options.max_episode,
            episodes_per_file: options.episodes_per_file,
            format: options.format,
            episode_concurrency: options.episode_concurrency,
            skip_existing: options.skip_existing,
            request_delay: Duration::from_millis(options.request_delay_ms),
            download_directory: config.download_directory(),
            referer: config.http.referer.clone(),
            show_progress: options.show_progress,
        }
    }

    /// Copy of these options pointed at another series with its own range
    /// and output preferences.
    pub fn for_series(
        &self,
        series_url: impl Into<String>,
        min_episode: u32,
        episodes_per_file: usize,
        format: OutputFormat,
    ) -> Self {
        Self {
            series_url: series_url.into(),
            min_episode,
            max_episode: u32::MAX,
            episodes_per_file,
            format,
            ..self.clone()
        }
    }
}
