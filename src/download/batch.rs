//! Fetching and assembling one batch into an output file.

use std::path::{Path, PathBuf};

use url::Url;

use crate::api::Fetcher;
use crate::comic::{new_comic_file, ComicMetadata};
use crate::config::DownloadOptions;
use crate::download::state::BatchStatus;
use crate::episode::{EpisodeBatch, SeriesInfo};
use crate::error::{Error, Result};

/// Whether an image link points at an animated format the output builders
/// cannot embed.
pub fn is_animated_image(link: &str) -> bool {
    let path = Url::parse(link)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| link.split(['?', '#']).next().unwrap_or(link).to_string());

    mime_guess::from_path(path)
        .first_raw()
        .is_some_and(|mime| mime == "image/gif")
}

fn batch_metadata(series: &SeriesInfo, batch: &EpisodeBatch) -> ComicMetadata {
    let number = if batch.min_episode == batch.max_episode {
        batch.min_episode.to_string()
    } else {
        format!("{}-{}", batch.min_episode, batch.max_episode)
    };

    ComicMetadata {
        title: batch.title.clone(),
        series: series.name.clone(),
        number,
    }
}

/// Download every image of `batch` in order and write them to `path`.
///
/// With skip-existing on and `path` already present, nothing is fetched.
/// Animated images are left out with a warning. Any fetch or encoding error
/// aborts this batch only.
pub async fn save_batch(
    fetcher: &dyn Fetcher,
    options: &DownloadOptions,
    series: &SeriesInfo,
    batch: &EpisodeBatch,
    path: &Path,
) -> Result<BatchStatus> {
    if options.skip_existing && path.exists() {
        tracing::info!("Skipping existing {}", path.display());
        return Ok(BatchStatus::Skipped);
    }

    let mut comic = new_comic_file(options.format, batch_metadata(series, batch));
    let mut skipped_animated = 0;

    for link in &batch.image_links {
        if is_animated_image(link) {
            tracing::warn!(
                "Skipping animated image {} of episodes {}-{}",
                link,
                batch.min_episode,
                batch.max_episode
            );
            skipped_animated += 1;
            continue;
        }

        let bytes = fetcher.fetch_bytes(link, &options.referer).await?;
        comic.append_page(&bytes)?;
    }

    let pages = comic.page_count();
    let target: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || comic.finalize(&target))
        .await
        .map_err(|e| Error::Worker(format!("finalize task failed: {}", e)))??;

    tracing::debug!("Wrote {} pages to {}", pages, path.display());
    Ok(BatchStatus::Saved {
        pages,
        skipped_animated,
    })
}
