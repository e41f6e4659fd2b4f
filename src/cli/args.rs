//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, DownloadOptions, OutputFormat};
use crate::store::ProgressRecord;

/// Webtoon downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "webtoon-dl",
    version,
    about = "Download webtoon series into PDF or CBZ files",
    long_about = "A CLI tool to download webtoon episodes and bundle them into PDF or CBZ files.\n\n\
                  Accepts a series listing URL or a single episode URL, and can keep every \
                  series recorded in its progress database up to date."
)]
pub struct Args {
    /// Series listing URL or single episode viewer URL.
    #[arg(required_unless_present = "db")]
    pub url: Option<String>,

    /// First episode to download.
    #[arg(long = "min-ep")]
    pub min_ep: Option<u32>,

    /// Last episode to download.
    #[arg(long = "max-ep")]
    pub max_ep: Option<u32>,

    /// Number of episodes bundled into each output file.
    #[arg(long = "eps-per-file")]
    pub eps_per_file: Option<usize>,

    /// Output file format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Output files assembled at the same time within one series.
    #[arg(long)]
    pub episode_concurrency: Option<usize>,

    /// Series downloaded at the same time in database mode.
    #[arg(long)]
    pub series_concurrency: Option<usize>,

    /// Download every stored series at once in database mode.
    #[arg(long)]
    pub max_series_concurrency: bool,

    /// Skip output files that already exist.
    #[arg(long)]
    pub skip_existing: bool,

    /// Update every series recorded in the progress database.
    #[arg(long)]
    pub db: bool,

    /// Continue the given series from its last recorded episode.
    #[arg(long, requires = "url", conflicts_with = "db")]
    pub resume: bool,

    /// Path to the progress database.
    #[arg(long = "database")]
    pub database_path: Option<PathBuf>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "webtoon-dl.toml")]
    pub config: PathBuf,

    /// Milliseconds to wait after every listing or episode page fetch.
    #[arg(long = "delay-ms")]
    pub delay_ms: Option<u64>,

    /// Browser user agent string.
    #[arg(long = "user-agent", env = "WEBTOON_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Write the merged configuration back to the configuration file.
    #[arg(long)]
    pub save_config: bool,

    /// Hide progress bars.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI output format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    /// One PDF page per image.
    Pdf,
    /// Zip archive of page images.
    Cbz,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Pdf => OutputFormat::Pdf,
            OutputFormatArg::Cbz => OutputFormat::Cbz,
        }
    }
}

/// Which resumable settings were given on the command line.
///
/// Settings given explicitly win over the ones stored with a series'
/// progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplicitSettings {
    pub min_episode: bool,
    pub episodes_per_file: bool,
    pub format: bool,
}

impl ExplicitSettings {
    /// Seed `options` from a stored progress record, leaving explicit
    /// settings alone.
    pub fn apply_progress(&self, options: &mut DownloadOptions, record: &ProgressRecord) {
        if !self.min_episode {
            options.min_episode = record.last_chapter.saturating_add(1);
        }
        if !self.episodes_per_file {
            options.episodes_per_file = record.episodes_per_file;
        }
        if !self.format {
            options.format = record.format;
        }
    }
}

impl Args {
    /// Settings given explicitly, recorded before the arguments are merged.
    pub fn explicit_settings(&self) -> ExplicitSettings {
        ExplicitSettings {
            min_episode: self.min_ep.is_some(),
            episodes_per_file: self.eps_per_file.is_some(),
            format: self.format.is_some(),
        }
    }

    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(dir) = self.download_directory {
            config.options.download_directory = Some(dir);
        }

        if let Some(min) = self.min_ep {
            config.options.min_episode = min;
        }

        if let Some(max) = self.max_ep {
            config.options.max_episode = max;
        }

        if let Some(per_file) = self.eps_per_file {
            config.options.episodes_per_file = per_file;
        }

        if let Some(format) = self.format {
            config.options.format = format.into();
        }

        if let Some(concurrency) = self.episode_concurrency {
            config.options.episode_concurrency = concurrency;
        }

        if let Some(concurrency) = self.series_concurrency {
            config.options.series_concurrency = concurrency;
        }

        if let Some(path) = self.database_path {
            config.options.database_path = path;
        }

        if let Some(delay) = self.delay_ms {
            config.options.request_delay_ms = delay;
        }

        if let Some(user_agent) = self.user_agent {
            config.http.user_agent = user_agent;
        }

        // Boolean flags (only override if set to non-default)
        if self.max_series_concurrency {
            config.options.max_series_concurrency = true;
        }

        if self.skip_existing {
            config.options.skip_existing = true;
        }

        if self.quiet {
            config.options.show_progress = false;
        }
    }
}
