//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::config::OutputFormat;
use crate::episode::{EpisodeBatch, SeriesInfo};
use crate::error::Result;
use crate::fs::naming::{batch_file_stem, sanitize_path_component};

/// Folder holding every output file of one series in one language:
/// `<download_dir>/<series>/<lang>`.
pub fn get_series_folder(download_dir: &Path, series: &SeriesInfo) -> Result<PathBuf> {
    Ok(download_dir
        .join(sanitize_path_component(&series.name)?)
        .join(sanitize_path_component(&series.lang)?))
}

/// Full output path of a batch.
pub fn get_output_path(
    download_dir: &Path,
    series: &SeriesInfo,
    batch: &EpisodeBatch,
    format: OutputFormat,
) -> Result<PathBuf> {
    let folder = get_series_folder(download_dir, series)?;
    let name = sanitize_path_component(&batch_file_stem(&series.name, batch))?;
    Ok(folder.join(format!("{}.{}", name, format.extension())))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> SeriesInfo {
        SeriesInfo {
            lang: "fr".into(),
            genre: "fantasy".into(),
            name: "tower-of-god".into(),
        }
    }

    #[test]
    fn test_get_series_folder() {
        let path = get_series_folder(Path::new("/downloads"), &series()).unwrap();
        assert_eq!(path, PathBuf::from("/downloads/tower-of-god/fr"));
    }

    #[test]
    fn test_get_output_path() {
        let batch = EpisodeBatch {
            image_links: Vec::new(),
            title: "Ep. 1_Ep. 2".into(),
            min_episode: 1,
            max_episode: 2,
        };
        let path =
            get_output_path(Path::new("/downloads"), &series(), &batch, OutputFormat::Cbz).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/downloads/tower-of-god/fr/tower-of-god-epNo1-epNo2_Ep. 1_Ep. 2.cbz")
        );
    }

    #[test]
    fn test_ensure_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }
}
