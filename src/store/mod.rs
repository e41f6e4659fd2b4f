//! Progress store module.
//!
//! Remembers the last downloaded episode of every series so later runs can
//! resume from there.

pub mod progress;

pub use progress::{ProgressRecord, ProgressStore, SqliteProgressStore};
