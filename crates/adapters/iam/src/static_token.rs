//! Fixed token provider

use async_trait::async_trait;
use errors::{AppError, AppResult};
use ports::{AccessToken, CredentialProvider};
use secrecy::{ExposeSecret, Secret};

/// Returns the same configured token on every call
pub struct StaticTokenProvider {
    token: Secret<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Secret<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn acquire_token(&self) -> AppResult<AccessToken> {
        let token = self.token.expose_secret();
        if token.trim().is_empty() {
            return Err(AppError::credential("Static access token is empty"));
        }
        Ok(AccessToken::new(token.clone()))
    }
}
