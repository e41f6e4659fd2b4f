//! Episode and batch representation.

use std::hash::{Hash, Hasher};

use crate::episode::link::extract_episode_number;

/// One episode found on a series listing page.
///
/// Identity is the URL alone; titles are not part of equality.
#[derive(Debug, Clone)]
pub struct EpisodeRef {
    pub url: String,
    pub title: String,
}

impl EpisodeRef {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }

    /// Episode number from the URL, `0` when unknown.
    pub fn number(&self) -> u32 {
        extract_episode_number(&self.url)
    }
}

impl PartialEq for EpisodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for EpisodeRef {}

impl Hash for EpisodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// One output file's worth of episodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeBatch {
    /// Image URLs in reading order.
    pub image_links: Vec<String>,
    pub title: String,
    pub min_episode: u32,
    pub max_episode: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_is_url_only() {
        let a = EpisodeRef::new("https://x/viewer?episode_no=1", "Ep. 1");
        let b = EpisodeRef::new("https://x/viewer?episode_no=1", "Episode 1 (remastered)");

        assert_eq!(a, b);

        let mut set = HashSet::new();
        assert!(set.insert(a));
        assert!(!set.insert(b));
    }

    #[test]
    fn test_number() {
        assert_eq!(EpisodeRef::new("https://x/viewer?episode_no=17", "").number(), 17);
        assert_eq!(EpisodeRef::new("https://x/list", "").number(), 0);
    }
}
