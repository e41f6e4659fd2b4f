//! Series and episode URL grammar.
//!
//! Listing pages look like
//! `https://www.webtoons.com/<lang>/<genre>/<series>/list?title_no=N`, episode
//! pages like `.../<series>/<episode-slug>/viewer?title_no=N&episode_no=M`.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

/// Series identity derived from a listing or viewer URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesInfo {
    pub lang: String,
    pub genre: String,
    pub name: String,
}

/// Parse the language, genre and series name out of a series URL.
pub fn parse_series_url(input: &str) -> Result<SeriesInfo> {
    let url = Url::parse(input.trim())
        .map_err(|e| Error::InvalidUrl(format!("{}: {}", input, e)))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if segments.len() < 3 {
        return Err(Error::InvalidUrl(format!(
            "expected /<lang>/<genre>/<series>/... in {}",
            input
        )));
    }

    Ok(SeriesInfo {
        lang: segments[0].to_string(),
        genre: segments[1].to_string(),
        name: segments[2].to_string(),
    })
}

/// Whether the URL points at a single episode rather than a listing.
pub fn is_viewer_url(url: &str) -> bool {
    url.contains("/viewer")
}

fn episode_no_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"episode_no=([0-9]+)").expect("literal pattern"))
}

/// Extract the `episode_no` query value from a URL.
///
/// Returns `0` when the parameter is missing or does not fit in a `u32`.
/// Callers treat `0` as "unknown": when every URL yields `0`, range filtering
/// and ordering both degrade to no-ops. A series that genuinely numbers an
/// episode `0` is indistinguishable from a missing number.
pub fn extract_episode_number(url: &str) -> u32 {
    episode_no_pattern()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// The episode slug path segment of a viewer URL, if present.
pub fn episode_slug(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [_, _, _, slug, "viewer", ..] => Some((*slug).to_string()),
        _ => None,
    }
}

/// Rewrite the `page` query parameter of a listing URL.
///
/// Every other query parameter keeps its position and `page` is
/// appended last.
pub fn page_url(base: &Url, page: u32) -> Url {
    let pairs: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &pairs {
            query.append_pair(key, value);
        }
        query.append_pair("page", &page.to_string());
    }
    url
}
