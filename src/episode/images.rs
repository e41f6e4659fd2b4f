//! Image link resolution for a single episode page.

use std::time::Duration;

use tokio::time::sleep;

use crate::api::Fetcher;
use crate::episode::parser::{
    extract_manifest_url, extract_path_rule, manifest_image_links, parse_manifest,
    parse_viewer_images,
};
use crate::error::{Error, Result};

/// Resolve the ordered image URLs of one episode.
///
/// The primary container of the episode page is tried first. When it holds
/// no images the episode is served by the motion-toon viewer, and the links
/// are rebuilt from its manifest. Any failure on that path is an
/// [`Error::Layout`]: the page no longer looks the way it should and
/// retrying will not help. A failed fetch of the episode page itself stays a
/// transient error.
pub async fn resolve_image_links(
    fetcher: &dyn Fetcher,
    episode_url: &str,
    delay: Duration,
) -> Result<Vec<String>> {
    let html = fetcher.fetch_document(episode_url).await?;
    sleep(delay).await;

    let links = parse_viewer_images(&html)?;
    if !links.is_empty() {
        return Ok(links);
    }

    tracing::debug!(
        "No images in viewer container of {}, trying motion-toon manifest",
        episode_url
    );
    resolve_motiontoon_links(fetcher, &html).await
}

async fn resolve_motiontoon_links(fetcher: &dyn Fetcher, html: &str) -> Result<Vec<String>> {
    let manifest_url = extract_manifest_url(html)?;
    let path_rule = extract_path_rule(html)?;

    let body = fetcher.fetch_document(&manifest_url).await.map_err(|e| {
        Error::Layout(format!(
            "could not fetch motion-toon manifest {}: {}",
            manifest_url, e
        ))
    })?;
    let manifest = parse_manifest(&body)?;

    Ok(manifest_image_links(&manifest, &path_rule))
}
