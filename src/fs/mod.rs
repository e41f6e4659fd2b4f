//! Filesystem module.
//!
//! Provides:
//! - Path and directory management
//! - Filename generation and sanitizing

pub mod naming;
pub mod paths;

pub use naming::{batch_file_stem, sanitize_path_component, sanitize_title};
pub use paths::{ensure_dir, get_output_path, get_series_folder};
