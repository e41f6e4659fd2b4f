//! Webtoon HTTP client.

use async_trait::async_trait;
use reqwest::{header, Client, Response};

use crate::api::fetcher::Fetcher;
use crate::error::{Error, Result};

/// HTTP client for listing pages, episode pages, manifests and images.
///
/// Cheap to share: the inner `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct WebtoonClient {
    client: Client,
}

impl WebtoonClient {
    /// Create a new client sending the given user agent.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Reject non-success responses.
    fn check_status(url: &str, response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("Response status for {}: {}", url, status);

        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for WebtoonClient {
    async fn fetch_document(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let response = Self::check_status(url, response)?;
        Ok(response.text().await?)
    }

    async fn fetch_bytes(&self, url: &str, referer: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {} (referer {})", url, referer);

        let response = self
            .client
            .get(url)
            .header(header::REFERER, referer)
            .send()
            .await?;
        let response = Self::check_status(url, response)?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Download(format!("Failed to read {}: {}", url, e)))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(WebtoonClient::new("webtoon-dl-test").is_ok());
    }
}
