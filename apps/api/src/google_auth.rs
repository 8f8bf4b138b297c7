//! OAuth access tokens for Google Cloud APIs.
//!
//! A token pinned through the environment is used as-is and will stop working
//! once it expires. Without one, tokens come from the GCE metadata server and
//! are cached until shortly before their reported expiry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::documents::DocumentError;

pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, DocumentError>;
}

/// A fixed bearer token, typically from `gcloud auth print-access-token`.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, DocumentError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn from_response(response: TokenResponse, now: Instant) -> Self {
        Self {
            value: response.access_token,
            expires_at: now + Duration::from_secs(response.expires_in),
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

/// Service-account tokens from the metadata server, refreshed on expiry.
pub struct MetadataServerToken {
    client: Client,
    url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataServerToken {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(10)).build()?,
            url: url.into(),
            cached: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> Result<TokenResponse, DocumentError> {
        let response = self
            .client
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| DocumentError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocumentError::Auth(format!(
                "metadata server returned HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DocumentError::Auth(e.to_string()))
    }
}

#[async_trait]
impl TokenProvider for MetadataServerToken {
    async fn access_token(&self) -> Result<String, DocumentError> {
        // Held across the fetch so concurrent callers share one refresh.
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.value.clone());
        }

        let token = CachedToken::from_response(self.fetch().await?, Instant::now());
        debug!("Fetched access token from metadata server");
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
