//! Credential provider trait 定义

use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use errors::AppResult;
use secrecy::{ExposeSecret, Secret};

/// 短期访问令牌
///
/// `Debug` 不会输出令牌内容
pub struct AccessToken {
    secret: Secret<String>,
    expires_at: Option<Instant>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            secret: Secret::new(token.into()),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: Instant) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// 是否已过期；无过期时间的令牌视为有效
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= Instant::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// 访问令牌提供者
///
/// 失败统一返回 `AppError::Credential`
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire_token(&self) -> AppResult<AccessToken>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_token_without_expiry_is_valid() {
        let token = AccessToken::new("abc");
        assert!(!token.is_expired());
        assert_eq!(token.expose(), "abc");
    }

    #[test]
    fn test_token_expiry() {
        let past = Instant::now() - Duration::from_secs(1);
        assert!(AccessToken::new("abc").with_expiry(past).is_expired());

        let future = Instant::now() + Duration::from_secs(3600);
        assert!(!AccessToken::new("abc").with_expiry(future).is_expired());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let output = format!("{:?}", AccessToken::new("t1.super-secret"));
        assert!(!output.contains("super-secret"));
        assert!(output.contains("REDACTED"));
    }
}
