//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made during a walk:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Resolving repository-relative paths against the base host
//! - GET requests returning page markup
//! - Error classification (status vs. network failures)
//!
//! There is no retry logic: the first failure is returned to the caller.

use crate::config::{ScraperConfig, UserAgentConfig};
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `scraper` - Timeouts for requests
/// * `user_agent` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    scraper: &ScraperConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(scraper.request_timeout_secs))
        .connect_timeout(Duration::from_secs(scraper.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages from one base host
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    base_url: Url,
}

impl PageFetcher {
    /// Creates a fetcher resolving paths against `base_url`
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Resolves a path or link target to an absolute URL
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|source| FetchError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    /// Fetches the markup at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Body of a 2xx response
    /// * `Err(FetchError::Status)` - Non-success status
    /// * `Err(FetchError::Network)` - Connection, timeout or body read failure
    pub async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.resolve(path)?;
        tracing::debug!("GET {}", url);

        let network = |source: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().await.map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(network)
    }
}
