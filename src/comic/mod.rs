//! Output file builders.
//!
//! Provides:
//! - The `ComicFile` capability shared by every output format
//! - PDF output (one page per image)
//! - CBZ output (zip archive of page images)

pub mod cbz;
pub mod pdf;

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::OutputFormat;
use crate::error::Result;

pub use cbz::CbzComic;
pub use pdf::PdfComic;

/// An output file being assembled page by page.
///
/// Pages appear in the final file in the order they were appended.
pub trait ComicFile: Send {
    /// Append one image as the next page.
    fn append_page(&mut self, image: &[u8]) -> Result<()>;

    /// Number of pages appended so far.
    fn page_count(&self) -> usize;

    /// Write the finished file to `path`.
    fn finalize(self: Box<Self>, path: &Path) -> Result<()>;
}

/// Descriptive metadata embedded in output files.
#[derive(Debug, Clone, Default)]
pub struct ComicMetadata {
    pub title: String,
    pub series: String,
    /// Episode number or range, e.g. `"12"` or `"12-14"`.
    pub number: String,
}

/// Create an empty builder for the given format.
pub fn new_comic_file(format: OutputFormat, metadata: ComicMetadata) -> Box<dyn ComicFile> {
    match format {
        OutputFormat::Pdf => Box::new(PdfComic::new(metadata)),
        OutputFormat::Cbz => Box::new(CbzComic::new(metadata)),
    }
}

/// Write `bytes` to a temporary sibling of `path`, then rename it into place.
///
/// Readers never observe a half-written output file, and a failed write
/// leaves any previous file untouched.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&parent)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("comic");
    let temp_path = parent.join(format!(".{}.{}.part", file_name, Uuid::new_v4()));

    fs::write(&temp_path, bytes)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::jpeg_bytes;

    #[test]
    fn test_write_atomically_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.bin");

        write_atomically(&path, b"hello").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"hello");
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_new_comic_file_per_format() {
        let dir = tempfile::tempdir().unwrap();

        for format in [OutputFormat::Pdf, OutputFormat::Cbz] {
            let mut comic = new_comic_file(format, ComicMetadata::default());
            comic.append_page(&jpeg_bytes(4, 4)).unwrap();
            assert_eq!(comic.page_count(), 1);

            let path = dir.path().join(format!("out.{}", format.extension()));
            comic.finalize(&path).unwrap();
            assert!(path.exists());
        }
    }
}
