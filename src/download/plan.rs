//! Batch planning: range selection, grouping and image link resolution.

use std::time::Duration;

use crate::api::Fetcher;
use crate::config::DownloadOptions;
use crate::download::catalog::crawl_catalog;
use crate::episode::link::episode_slug;
use crate::episode::{extract_episode_number, is_viewer_url, resolve_image_links};
use crate::episode::{EpisodeBatch, EpisodeRef};
use crate::error::{Error, Result};

/// Separator between episode titles in a batch title.
const TITLE_SEPARATOR: &str = "_";

/// Plan every batch of one run.
///
/// A single-episode viewer URL skips the crawl and yields exactly one batch.
/// A listing URL is crawled, filtered to the requested range and grouped.
pub async fn plan_series(
    fetcher: &dyn Fetcher,
    options: &DownloadOptions,
) -> Result<Vec<EpisodeBatch>> {
    if is_viewer_url(&options.series_url) {
        let batch = plan_single_episode(fetcher, &options.series_url, options.request_delay).await?;
        return Ok(vec![batch]);
    }

    let catalog = crawl_catalog(fetcher, &options.series_url, options.request_delay).await?;
    plan_batches(
        fetcher,
        &catalog,
        options.min_episode,
        options.max_episode,
        options.episodes_per_file,
        options.request_delay,
    )
    .await
}

/// One batch holding the episode behind a viewer URL.
pub async fn plan_single_episode(
    fetcher: &dyn Fetcher,
    episode_url: &str,
    delay: Duration,
) -> Result<EpisodeBatch> {
    let number = extract_episode_number(episode_url);
    let image_links = resolve_image_links(fetcher, episode_url, delay).await?;

    Ok(EpisodeBatch {
        image_links,
        title: episode_slug(episode_url).unwrap_or_default(),
        min_episode: number,
        max_episode: number,
    })
}

/// Filter `catalog` to `[min_episode, max_episode]`, group it into chunks of
/// `episodes_per_file` and resolve the images of every chunk.
///
/// Episodes inside a chunk are resolved one after another so their images
/// stay in reading order.
pub async fn plan_batches(
    fetcher: &dyn Fetcher,
    catalog: &[EpisodeRef],
    min_episode: u32,
    max_episode: u32,
    episodes_per_file: usize,
    delay: Duration,
) -> Result<Vec<EpisodeBatch>> {
    let selected = select_episodes(catalog, min_episode, max_episode)?;
    let chunks = chunk_episodes(&selected, episodes_per_file);

    let mut batches = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let mut image_links = Vec::new();
        for episode in chunk {
            tracing::debug!("Resolving images of {}", episode.url);
            image_links.extend(resolve_image_links(fetcher, &episode.url, delay).await?);
        }

        let (first, last) = match (chunk.first(), chunk.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => continue,
        };

        batches.push(EpisodeBatch {
            image_links,
            title: batch_title(chunk),
            min_episode: first.number(),
            max_episode: last.number(),
        });
    }

    Ok(batches)
}

/// Keep the episodes whose number lies in `[min_episode, max_episode]`.
///
/// An empty selection is an [`Error::NoEpisodesInRange`].
pub fn select_episodes(
    catalog: &[EpisodeRef],
    min_episode: u32,
    max_episode: u32,
) -> Result<Vec<EpisodeRef>> {
    let selected: Vec<EpisodeRef> = catalog
        .iter()
        .filter(|episode| (min_episode..=max_episode).contains(&episode.number()))
        .cloned()
        .collect();

    let (first, last) = match (selected.first(), selected.last()) {
        (Some(first), Some(last)) => (first.number(), last.number()),
        _ => {
            return Err(Error::NoEpisodesInRange {
                min: min_episode,
                max: max_episode,
            })
        }
    };

    tracing::info!(
        "Selected {} episodes ({} to {})",
        selected.len(),
        min_episode.max(first),
        max_episode.min(last)
    );

    Ok(selected)
}

/// Contiguous, order-preserving chunks of at most `episodes_per_file`.
pub fn chunk_episodes(episodes: &[EpisodeRef], episodes_per_file: usize) -> Vec<&[EpisodeRef]> {
    episodes.chunks(episodes_per_file.max(1)).collect()
}

/// Episode titles joined in order.
pub fn batch_title(episodes: &[EpisodeRef]) -> String {
    episodes
        .iter()
        .map(|episode| episode.title.as_str())
        .collect::<Vec<_>>()
        .join(TITLE_SEPARATOR)
}
