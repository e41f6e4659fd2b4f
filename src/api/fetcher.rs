//! Page and image fetching abstraction.

use async_trait::async_trait;

use crate::error::Result;

/// Source of page documents and image bytes.
///
/// Every method blocks the calling task until the response arrives or the
/// request fails. Non-success HTTP statuses are errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page (HTML or JSON) as text.
    async fn fetch_document(&self, url: &str) -> Result<String>;

    /// Fetch raw bytes, sending `referer` as the `Referer` header.
    async fn fetch_bytes(&self, url: &str, referer: &str) -> Result<Vec<u8>>;
}
