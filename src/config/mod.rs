//! Configuration module for the webtoon-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Building the immutable per-run download options
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod options;
pub mod validation;

pub use loader::{Config, HttpConfig, OptionsConfig};
pub use modes::OutputFormat;
pub use options::DownloadOptions;
pub use validation::{validate_config, validate_range};
