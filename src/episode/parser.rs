//! HTML and text extraction for listing and viewer pages.
//!
//! Everything here is synchronous and works on page source strings, so parsed
//! documents never live across an `.await`.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::api::types::MotiontoonManifest;
use crate::episode::item::EpisodeRef;
use crate::episode::link::episode_slug;
use crate::error::{Error, Result};

/// Container holding the episode list on a listing page.
const LISTING_ANCHORS: &str = "div.detail_lst a";

/// Caption text inside an episode anchor.
const EPISODE_TITLE: &str = "span.subj span";

/// Images of an episode page.
const VIEWER_IMAGES: &str = "div.viewer_lst img";

/// Attribute holding the real image URL (the `src` is a lazy-load placeholder).
const IMAGE_URL_ATTR: &str = "data-url";

/// Placeholder in the motion-toon path rule replaced by each filename.
const FILENAME_PLACEHOLDER: &str = "{=filename}";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Layout(format!("bad selector '{}': {:?}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract every episode anchor of a listing page, in page order.
///
/// Relative links are resolved against `base`. Anchors that do not point at
/// a viewer page are ignored. When the caption is empty the episode slug of
/// the URL is used as title.
pub fn parse_listing(html: &str, base: &Url) -> Result<Vec<EpisodeRef>> {
    let anchors = selector(LISTING_ANCHORS)?;
    let title = selector(EPISODE_TITLE)?;
    let document = Html::parse_document(html);

    let mut episodes = Vec::new();
    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains("/viewer") {
            continue;
        }

        let url = match base.join(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("Skipping unparseable episode link {}: {}", href, e);
                continue;
            }
        };

        let caption = anchor
            .select(&title)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let caption = if caption.is_empty() {
            episode_slug(&url).unwrap_or_default()
        } else {
            caption
        };

        episodes.push(EpisodeRef::new(url, caption));
    }

    Ok(episodes)
}

/// Image URLs of an episode page's primary image container.
///
/// Returns an empty list when the container holds no images, which means the
/// episode is served through the motion-toon viewer instead.
pub fn parse_viewer_images(html: &str) -> Result<Vec<String>> {
    let images = selector(VIEWER_IMAGES)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&images)
        .filter_map(|img| img.value().attr(IMAGE_URL_ATTR))
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
        .collect())
}

fn document_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)viewerOptions:\s*\{.*?containerId:\s*'#ozViewer',.*?documentURL:\s*'([^']+)'")
            .expect("literal pattern")
    })
}

fn path_rule_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"motiontoonParam:\s*\{\s*pathRuleParam:\s*\{\s*stillcut:\s*'([^']+)'")
            .expect("literal pattern")
    })
}

/// URL of the motion-toon manifest embedded in the viewer options script.
pub fn extract_manifest_url(html: &str) -> Result<String> {
    document_url_pattern()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::Layout("could not find documentURL".into()))
}

/// Still-image path template containing the `{=filename}` placeholder.
pub fn extract_path_rule(html: &str) -> Result<String> {
    let rule = path_rule_pattern()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::Layout("could not find pathRule".into()))?;

    if !rule.contains(FILENAME_PLACEHOLDER) {
        return Err(Error::Layout(format!(
            "pathRule has no {} placeholder: {}",
            FILENAME_PLACEHOLDER, rule
        )));
    }

    Ok(rule)
}

/// Parse a manifest document. Malformed JSON means the viewer changed.
pub fn parse_manifest(body: &str) -> Result<MotiontoonManifest> {
    serde_json::from_str(body)
        .map_err(|e| Error::Layout(format!("malformed motion-toon manifest: {}", e)))
}

/// Final image URLs for a manifest, in page order.
pub fn manifest_image_links(manifest: &MotiontoonManifest, path_rule: &str) -> Vec<String> {
    manifest
        .ordered_filenames()
        .map(|filename| path_rule.replace(FILENAME_PLACEHOLDER, filename))
        .collect()
}
