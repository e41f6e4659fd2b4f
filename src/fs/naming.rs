//! Filename generation and sanitizing.

use crate::episode::EpisodeBatch;
use crate::error::{Error, Result};

/// Longest batch title kept in a filename, in characters.
const MAX_TITLE_CHARS: usize = 120;

/// Sanitize a path component (folder or file name).
///
/// Path separators and characters invalid on common filesystems are replaced
/// with underscores. Traversal patterns and null bytes are rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Make free-form text (episode titles) safe to embed in a filename.
///
/// Unlike [`sanitize_path_component`] this never fails: dot runs are
/// collapsed, surrounding dots and spaces trimmed, and the result is cut to
/// a bounded length.
pub fn sanitize_title(title: &str) -> String {
    let mut cleaned = String::with_capacity(title.len());
    let mut previous = None;
    for c in title.chars() {
        let c = match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        };
        if c == '.' && previous == Some('.') {
            continue;
        }
        cleaned.push(c);
        previous = Some(c);
    }

    let trimmed = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    trimmed
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Output file name for a batch, without extension.
///
/// `<series>-epNo<min>` for a single episode, `<series>-epNo<min>-epNo<max>`
/// for a range, followed by `_<title>` when the batch has a title.
pub fn batch_file_stem(series: &str, batch: &EpisodeBatch) -> String {
    let mut stem = if batch.min_episode == batch.max_episode {
        format!("{}-epNo{}", series, batch.min_episode)
    } else {
        format!(
            "{}-epNo{}-epNo{}",
            series, batch.min_episode, batch.max_episode
        )
    };

    let title = sanitize_title(&batch.title);
    if !title.is_empty() {
        stem.push('_');
        stem.push_str(&title);
    }

    stem
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(min: u32, max: u32, title: &str) -> EpisodeBatch {
        EpisodeBatch {
            image_links: Vec::new(),
            title: title.to_string(),
            min_episode: min,
            max_episode: max,
        }
    }

    #[test]
    fn test_sanitize_path_component_valid() {
        assert_eq!(sanitize_path_component("tower-of-god").unwrap(), "tower-of-god");
        assert_eq!(
            sanitize_path_component("path/to/name").unwrap(),
            "path_to_name"
        );
    }

    #[test]
    fn test_sanitize_path_component_traversal() {
        assert!(sanitize_path_component("../evil").is_err());
        assert!(sanitize_path_component("foo/../bar").is_err());
        assert!(sanitize_path_component("nul\0byte").is_err());
        assert!(sanitize_path_component("   ").is_err());
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Ep. 3: The Door?"), "Ep. 3_ The Door_");
        assert_eq!(sanitize_title("../../etc"), "_._etc");
        assert_eq!(sanitize_title("  ...  "), "");
    }

    #[test]
    fn test_sanitize_title_truncates() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_title(&long).chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_batch_file_stem_single() {
        assert_eq!(
            batch_file_stem("tower-of-god", &batch(7, 7, "Ep. 7")),
            "tower-of-god-epNo7_Ep. 7"
        );
    }

    #[test]
    fn test_batch_file_stem_range_without_title() {
        assert_eq!(
            batch_file_stem("tower-of-god", &batch(1, 3, "")),
            "tower-of-god-epNo1-epNo3"
        );
    }
}
