//! Test fixtures: an in-memory fetcher and page builders.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use tokio::time::{sleep, Instant};
use url::Url;

use crate::api::Fetcher;
use crate::episode::link::page_url;
use crate::error::{Error, Result};

pub const SERIES_URL: &str = "https://www.webtoons.com/en/drama/sample/list?title_no=7";

pub fn episode_url(number: u32) -> String {
    series_episode_url(SERIES_URL, number)
}

/// Viewer URL of episode `number` of the series listed at `series_url`.
pub fn series_episode_url(series_url: &str, number: u32) -> String {
    format!(
        "{}&episode_no={}",
        series_url.replace("/list?", &format!("/ep-{}/viewer?", number)),
        number
    )
}

pub fn listing_url(page: u32) -> String {
    page_url(&Url::parse(SERIES_URL).unwrap(), page).to_string()
}

pub fn image_url(episode: u32, page: u32) -> String {
    format!("https://cdn.example.com/{}/{:03}.jpg", episode, page)
}

/// Listing page HTML with one anchor per `(episode number, caption)`.
pub fn listing_page(episodes: &[(u32, &str)]) -> String {
    series_listing_page(SERIES_URL, episodes)
}

fn series_listing_page(series_url: &str, episodes: &[(u32, &str)]) -> String {
    let items: String = episodes
        .iter()
        .map(|(number, title)| {
            format!(
                r#"<li><a href="{}"><span class="subj"><span>{}</span></span></a></li>"#,
                series_episode_url(series_url, *number).replace('&', "&amp;"),
                title
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="detail_lst"><ul id="_listUl">{}</ul></div></body></html>"#,
        items
    )
}

/// Episode page HTML with the given images in the primary container.
pub fn viewer_page(images: &[&str]) -> String {
    let imgs: String = images
        .iter()
        .map(|src| format!(r#"<img src="bg_transparency.png" data-url="{}">"#, src))
        .collect();
    format!(
        r#"<html><body><div class="viewer_lst"><div class="viewer_img">{}</div></div></body></html>"#,
        imgs
    )
}

/// Episode page HTML served through the motion-toon viewer.
pub fn motiontoon_page(document_url: &str, path_rule: &str) -> String {
    format!(
        r#"<html><body><div class="viewer_lst"></div><script>
    var viewer = new oz.Viewer({{
        viewerOptions: {{
            // 필수항목
            containerId: '#ozViewer',
            documentURL: '{}',
            useBackgroundAudio: false
        }},
        motiontoonParam: {{
            pathRuleParam: {{
                stillcut: '{}',
                sound: ''
            }}
        }}
    }});
</script></body></html>"#,
        document_url, path_rule
    )
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90])));
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// In-memory fetcher serving canned responses and recording requests.
#[derive(Default)]
pub struct MockFetcher {
    documents: HashMap<String, String>,
    bytes: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    requests: Mutex<Vec<(String, Instant)>>,
    referers: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }

    pub fn with_bytes(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.bytes.insert(url.into(), bytes);
        self
    }

    /// Respond to `url` with HTTP 503.
    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Panic when `url` is requested.
    pub fn panicking(mut self, url: impl Into<String>) -> Self {
        self.panicking.insert(url.into());
        self
    }

    /// Serve `pages` as listing pages 1..=K and repeat the last one for K+1,
    /// the way the site re-serves its final page.
    pub fn with_listing(mut self, pages: &[&[(u32, &str)]]) -> Self {
        for (index, episodes) in pages.iter().enumerate() {
            self = self.with_document(listing_url(index as u32 + 1), listing_page(episodes));
        }
        if let Some(last) = pages.last() {
            self = self.with_document(listing_url(pages.len() as u32 + 1), listing_page(last));
        }
        self
    }

    /// Serve a one-page listing at `series_url` (plus its repeat) and a
    /// viewer page with a single JPEG image for every episode in `numbers`.
    pub fn with_series(mut self, series_url: &str, numbers: &[u32]) -> Self {
        let base = Url::parse(series_url).unwrap();
        let captions: Vec<String> = numbers.iter().map(|n| format!("Ep. {}", n)).collect();
        let episodes: Vec<(u32, &str)> = numbers
            .iter()
            .zip(&captions)
            .map(|(n, caption)| (*n, caption.as_str()))
            .collect();
        let listing = series_listing_page(series_url, &episodes);
        self = self
            .with_document(page_url(&base, 1).to_string(), listing.clone())
            .with_document(page_url(&base, 2).to_string(), listing);

        for number in numbers {
            let link = format!("https://cdn.example.com{}/{}/001.jpg", base.path(), number);
            self = self
                .with_document(series_episode_url(series_url, *number), viewer_page(&[link.as_str()]))
                .with_bytes(link, jpeg_bytes(8, 12));
        }
        self
    }

    /// Serve a viewer page for `episode` with `pages` JPEG images.
    pub fn with_episode(mut self, episode: u32, pages: u32) -> Self {
        let links: Vec<String> = (1..=pages).map(|page| image_url(episode, page)).collect();
        let refs: Vec<&str> = links.iter().map(String::as_str).collect();
        self = self.with_document(episode_url(episode), viewer_page(&refs));
        for link in links {
            self = self.with_bytes(link, jpeg_bytes(8, 12));
        }
        self
    }

    /// Every URL requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// When each request was made, on the tokio clock.
    pub fn request_times(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    pub fn referers(&self) -> Vec<String> {
        self.referers.lock().unwrap().clone()
    }

    fn record(&self, url: &str) -> Result<()> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        if self.panicking.contains(url) {
            panic!("mock fetcher told to panic on {}", url);
        }
        if self.failing.contains(url) {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_document(&self, url: &str) -> Result<String> {
        self.record(url)?;
        self.documents.get(url).cloned().ok_or_else(|| Error::HttpStatus {
            url: url.to_string(),
            status: 404,
        })
    }

    async fn fetch_bytes(&self, url: &str, referer: &str) -> Result<Vec<u8>> {
        self.record(url)?;
        self.referers.lock().unwrap().push(referer.to_string());
        self.bytes.get(url).cloned().ok_or_else(|| Error::HttpStatus {
            url: url.to_string(),
            status: 404,
        })
    }
}


/// Fetcher that holds every request open for `latency` and remembers the
/// highest number of requests in flight at once.
pub struct GaugedFetcher {
    inner: MockFetcher,
    latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl GaugedFetcher {
    pub fn new(inner: MockFetcher, latency: Duration) -> Self {
        Self {
            inner,
            latency,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.inner.requests()
    }

    async fn hold(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for GaugedFetcher {
    async fn fetch_document(&self, url: &str) -> Result<String> {
        self.hold().await;
        self.inner.fetch_document(url).await
    }

    async fn fetch_bytes(&self, url: &str, referer: &str) -> Result<Vec<u8>> {
        self.hold().await;
        self.inner.fetch_bytes(url, referer).await
    }
}
