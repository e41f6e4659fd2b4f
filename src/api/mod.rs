//! Site access module.
//!
//! Provides:
//! - The `Fetcher` abstraction used by every component that talks to the site
//! - A reqwest-backed implementation
//! - Response types for the motion-toon manifest

pub mod client;
pub mod fetcher;
pub mod types;

pub use client::WebtoonClient;
pub use fetcher::Fetcher;
pub use types::MotiontoonManifest;
