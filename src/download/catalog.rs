//! Episode catalog crawling.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;
use url::Url;

use crate::api::Fetcher;
use crate::episode::link::page_url;
use crate::episode::parser::parse_listing;
use crate::episode::EpisodeRef;
use crate::error::{Error, Result};

/// Walk the listing pages of a series and return its episodes sorted by
/// episode number.
///
/// The site re-serves its last listing page for any page number past the
/// end, so the crawl stops at the first episode already seen. A page that
/// fails to load, or lists no episodes, also ends the crawl: discovery may
/// come up short on a flaky connection, but it never loops forever.
///
/// `delay` is slept after every page fetch.
pub async fn crawl_catalog(
    fetcher: &dyn Fetcher,
    series_url: &str,
    delay: Duration,
) -> Result<Vec<EpisodeRef>> {
    let base = Url::parse(series_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", series_url, e)))?;

    let mut seen: HashSet<EpisodeRef> = HashSet::new();
    let mut catalog: Vec<EpisodeRef> = Vec::new();
    let mut page = 1u32;

    'pages: loop {
        let url = page_url(&base, page);
        tracing::debug!("Fetching listing page {}", page);

        let fetched = fetcher.fetch_document(url.as_str()).await;
        sleep(delay).await;

        let html = match fetched {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(
                    "Listing page {} could not be loaded, stopping crawl: {}",
                    page,
                    e
                );
                break;
            }
        };

        let episodes = parse_listing(&html, &url)?;
        if episodes.is_empty() {
            tracing::debug!("Listing page {} has no episodes", page);
            break;
        }

        for episode in episodes {
            if seen.contains(&episode) {
                tracing::debug!(
                    "Listing page {} repeats {}, end of pagination",
                    page,
                    episode.url
                );
                break 'pages;
            }
            seen.insert(episode.clone());
            catalog.push(episode);
        }

        page += 1;
    }

    catalog.sort_by_key(EpisodeRef::number);
    tracing::info!("Found {} episodes after {} listing pages", catalog.len(), page);

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{episode_url, listing_page, listing_url, MockFetcher, SERIES_URL};

    fn numbers(catalog: &[EpisodeRef]) -> Vec<u32> {
        catalog.iter().map(EpisodeRef::number).collect()
    }

    #[tokio::test]
    async fn test_stops_when_last_page_repeats() {
        let fetcher = MockFetcher::new().with_listing(&[
            &[(6, "Ep. 6"), (5, "Ep. 5"), (4, "Ep. 4")],
            &[(3, "Ep. 3"), (2, "Ep. 2"), (1, "Ep. 1")],
        ]);

        let catalog = crawl_catalog(&fetcher, SERIES_URL, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(numbers(&catalog), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(catalog[0].title, "Ep. 1");
        assert_eq!(catalog[0].url, episode_url(1));
        assert_eq!(
            fetcher.requests(),
            vec![listing_url(1), listing_url(2), listing_url(3)]
        );
    }

    #[tokio::test]
    async fn test_single_page_series() {
        let fetcher = MockFetcher::new().with_listing(&[&[(2, "Two"), (1, "One")]]);

        let catalog = crawl_catalog(&fetcher, SERIES_URL, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(numbers(&catalog), vec![1, 2]);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_ends_crawl() {
        let fetcher = MockFetcher::new()
            .with_document(listing_url(1), listing_page(&[(9, "Nine"), (8, "Eight")]))
            .failing(listing_url(2));

        let catalog = crawl_catalog(&fetcher, SERIES_URL, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(numbers(&catalog), vec![8, 9]);
    }

    #[tokio::test]
    async fn test_first_page_failure_yields_empty_catalog() {
        let fetcher = MockFetcher::new().failing(listing_url(1));

        let catalog = crawl_catalog(&fetcher, SERIES_URL, Duration::ZERO)
            .await
            .unwrap();

        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_empty_page_ends_crawl() {
        let fetcher = MockFetcher::new()
            .with_document(listing_url(1), listing_page(&[(1, "One")]))
            .with_document(listing_url(2), listing_page(&[]));

        let catalog = crawl_catalog(&fetcher, SERIES_URL, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(numbers(&catalog), vec![1]);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_after_every_listing_page() {
        let delay = Duration::from_millis(200);
        let fetcher = MockFetcher::new().with_listing(&[
            &[(4, "Ep. 4"), (3, "Ep. 3")],
            &[(2, "Ep. 2"), (1, "Ep. 1")],
        ]);

        let start = tokio::time::Instant::now();
        let catalog = crawl_catalog(&fetcher, SERIES_URL, delay).await.unwrap();

        assert_eq!(numbers(&catalog), vec![1, 2, 3, 4]);
        assert!(start.elapsed() >= delay * 3);

        let times = fetcher.request_times();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= delay);
        }
    }

    #[test]
    fn test_invalid_series_url() {
        let fetcher = MockFetcher::new();
        let result = tokio_test::block_on(crawl_catalog(&fetcher, "not a url", Duration::ZERO));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
