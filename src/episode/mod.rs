//! Episode module: URL grammar, page parsing and image link resolution.

pub mod images;
pub mod item;
pub mod link;
pub mod parser;

pub use images::resolve_image_links;
pub use item::{EpisodeBatch, EpisodeRef};
pub use link::{extract_episode_number, is_viewer_url, parse_series_url, SeriesInfo};
