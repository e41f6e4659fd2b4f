//! Download module for episode discovery and output assembly.
//!
//! This module provides:
//! - Catalog crawling over paginated listing pages
//! - Batch planning (range selection, grouping, image resolution)
//! - Batch fetching and assembly into output files
//! - Series jobs with bounded concurrency and progress updates
//! - Download state tracking

pub mod batch;
pub mod catalog;
pub mod plan;
pub mod series;
pub mod state;

pub use batch::save_batch;
pub use catalog::crawl_catalog;
pub use plan::{batch_title, plan_batches, plan_series, select_episodes};
pub use series::{download_all_series, download_series, resume_series, run_batches};
pub use state::{BatchReport, BatchStatus, GlobalState, SeriesState};
