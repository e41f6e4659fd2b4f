//! Output format definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One PDF page per image (default).
    #[default]
    Pdf,
    /// Zip-based comic book archive.
    Cbz,
}

impl OutputFormat {
    /// File extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Cbz => "cbz",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "cbz" => Ok(OutputFormat::Cbz),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("pdf".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!("CBZ".parse::<OutputFormat>().unwrap(), OutputFormat::Cbz);
        assert!("epub".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_display_matches_extension() {
        assert_eq!(OutputFormat::Cbz.to_string(), "cbz");
        assert_eq!(OutputFormat::Pdf.extension(), "pdf");
    }
}
