//! Error types for the webtoon-downloader application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // User input errors
    #[error("Invalid series URL: {0}")]
    InvalidUrl(String),

    #[error("No episode found between {min} and {max}")]
    NoEpisodesInRange { min: u32, max: u32 },

    // Site layout errors (retrying will not help)
    #[error("Page layout changed: {0}")]
    Layout(String),

    // Network errors
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Download failed: {0}")]
    Download(String),

    // Output file errors
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Comic file has no pages: {0}")]
    EmptyComic(String),

    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // Progress store errors
    #[error("Progress store error: {0}")]
    Store(#[from] tokio_rusqlite::Error),

    // Worker errors
    #[error("Worker crashed: {0}")]
    Worker(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of failure, used to decide how far an error propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network hiccup: ends a crawl early, aborts a single batch.
    Transient,
    /// The site no longer matches the expected markup; the run cannot continue.
    Structural,
    /// Bad input or configuration; reported before any work starts.
    User,
    /// Image decoding or output writing; aborts the owning batch only.
    Encoding,
    /// Anything else, including crashed workers and the progress store.
    Internal,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_)
            | Error::ConfigValidation { .. }
            | Error::MissingConfig(_)
            | Error::InvalidUrl(_)
            | Error::NoEpisodesInRange { .. }
            | Error::TomlParse(_) => ErrorKind::User,
            Error::Layout(_) => ErrorKind::Structural,
            Error::HttpStatus { .. } | Error::Download(_) | Error::Http(_) => ErrorKind::Transient,
            Error::Pdf(_)
            | Error::Archive(_)
            | Error::Image(_)
            | Error::EmptyComic(_)
            | Error::InvalidFilename(_)
            | Error::Io(_) => ErrorKind::Encoding,
            Error::Store(_) | Error::Worker(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error must stop the whole run, not just the series or
    /// batch that hit it.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const LAYOUT_ERROR: i32 = 5;
    pub const UNEXPECTED_ERROR: i32 = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_errors_are_fatal() {
        let err = Error::Layout("could not find documentURL".into());
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_network_errors_are_not_fatal() {
        let err = Error::HttpStatus {
            url: "https://example.com".into(),
            status: 503,
        };
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_empty_range_is_user_error() {
        let err = Error::NoEpisodesInRange { min: 10, max: 20 };
        assert_eq!(err.kind(), ErrorKind::User);
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "No episode found between 10 and 20");
    }
}
