//! Page fetching.
//!
//! Two providers share one contract "give me the text behind this URL":
//! a plain HTTP fetch for the league site's static markup, and a render
//! gateway that returns the page text after script execution. The
//! gateway is the heavier fallback and runs under its own deadline so a
//! wedged render can never hang an invocation.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::FetchError;

/// Plain HTTP page fetcher.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Build a fetcher with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Build)?;
        Ok(Self { client })
    }

    /// GET a URL and return the response body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url = %url, "fetching page");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}

/// Client for the rendering gateway: an HTTP service that loads a page
/// in a headless browser and returns the rendered text.
#[derive(Debug, Clone)]
pub struct RenderGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RenderGateway {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(FetchError::Build)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Render a page and return its text. The whole round trip runs
    /// under the gateway deadline.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, transport failure or a non-success
    /// status.
    pub async fn render(&self, url: &str) -> Result<String, FetchError> {
        let endpoint = format!("{}/render?url={}", self.base_url, urlencoding::encode(url));
        info!(url = %url, "requesting rendered page");

        let round_trip = async {
            let resp = self.client.get(&endpoint).send().await.map_err(|source| {
                FetchError::Request {
                    url: endpoint.clone(),
                    source,
                }
            })?;

            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: endpoint.clone(),
                    status: status.as_u16(),
                });
            }

            resp.text().await.map_err(|source| FetchError::Request {
                url: endpoint.clone(),
                source,
            })
        };

        tokio::time::timeout(self.timeout, round_trip)
            .await
            .map_err(|_| FetchError::RenderTimeout {
                timeout_secs: self.timeout.as_secs(),
            })?
    }
}
