//! Webtoon Downloader - download webtoon series into PDF or CBZ files
//!
//! This library discovers the episodes of a series, resolves their images and
//! bundles them into output files, remembering progress between runs.
//!
//! # Features
//!
//! - Paginated episode discovery from a series listing
//! - Single episode downloads from a viewer URL
//! - Motion-toon episodes through their JSON manifest
//! - Several episodes per output file, PDF or CBZ
//! - Bounded concurrency per series and across series
//! - Resumable progress stored in SQLite
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use webtoon_downloader::{download_series, Config, DownloadOptions, WebtoonClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let client = WebtoonClient::new(&config.http.user_agent)?;
//!     let options = DownloadOptions::from_config(
//!         &config,
//!         "https://www.webtoons.com/en/fantasy/tower-of-god/list?title_no=95",
//!     );
//!
//!     let state = download_series(Arc::new(client), None, Arc::new(options)).await?;
//!     println!("{} files saved", state.saved_count());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod comic;
pub mod config;
pub mod download;
pub mod episode;
pub mod error;
pub mod fs;
pub mod output;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use api::{Fetcher, WebtoonClient};
pub use config::{Config, DownloadOptions, OutputFormat};
pub use download::{download_all_series, download_series, GlobalState, SeriesState};
pub use episode::{EpisodeBatch, EpisodeRef};
pub use error::{Error, Result};
pub use store::{ProgressStore, SqliteProgressStore};
