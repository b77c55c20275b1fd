//! Instance metadata token provider

use std::time::{Duration, Instant};

use async_trait::async_trait;
use errors::{AppError, AppResult};
use ports::{AccessToken, CredentialProvider};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::map_token_error;

/// Header the metadata service requires on every request
pub const METADATA_FLAVOR_HEADER: (&str, &str) = ("Metadata-Flavor", "Google");

/// Token endpoint response body
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Convert into an access token expiring relative to `issued_at`
    pub fn into_token(self, issued_at: Instant) -> AppResult<AccessToken> {
        if self.access_token.trim().is_empty() {
            return Err(AppError::credential("Metadata service returned an empty token"));
        }
        let token = AccessToken::new(self.access_token);
        // Lifetimes past the clock's range are treated as non-expiring
        match issued_at.checked_add(Duration::from_secs(self.expires_in)) {
            Some(expires_at) => Ok(token.with_expiry(expires_at)),
            None => Ok(token),
        }
    }
}

/// Fetches the token of the service account attached to the instance
pub struct MetadataTokenProvider {
    client: reqwest::Client,
    url: String,
}

impl MetadataTokenProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build metadata client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CredentialProvider for MetadataTokenProvider {
    async fn acquire_token(&self) -> AppResult<AccessToken> {
        debug!(url = %self.url, "Requesting access token");
        let issued_at = Instant::now();

        let response = self
            .client
            .get(&self.url)
            .header(METADATA_FLAVOR_HEADER.0, METADATA_FLAVOR_HEADER.1)
            .send()
            .await
            .map_err(|e| map_token_error(e, "Metadata service unreachable"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::credential(format!(
                "Metadata service returned {}",
                status
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| map_token_error(e, "Failed to decode token response"))?;

        info!(expires_in = body.expires_in, "Got access token");
        body.into_token(issued_at)
    }
}
