//! Web text extraction: fetch a page, strip markup, return plain text.
//!
//! `PageFetcher` is the seam between the scraping logic and the network;
//! `HttpFetcher` is the production implementation.

pub mod collector;
pub mod html;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Per-request timeout for page fetches.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like identification to get past trivial bot blocking.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Elements whose text never belongs in a job description.
const JD_SKIPPED_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Fetches the body of a page. Non-success statuses are errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(BROWSER_USER_AGENT)
                .build()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        debug!("Fetched {url} ({} bytes)", body.len());
        Ok(body)
    }
}

/// Parses `raw` and accepts only absolute http(s) URLs.
pub fn parse_http_url(raw: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        "http" | "https" => Err(invalid("missing host".to_string())),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// Fetches a job description page and returns its visible text.
pub async fn extract_text_from_url(
    fetcher: &dyn PageFetcher,
    url: &str,
) -> Result<String, FetchError> {
    let url = parse_http_url(url)?;
    let body = fetcher.fetch(url.as_str()).await?;
    Ok(html::html_to_text(&body, JD_SKIPPED_ELEMENTS))
}
