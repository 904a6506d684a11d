//! TokenProvider trait and AccessToken

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::AuthError;

/// A bearer token with optional expiration.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The bearer token used for API authentication.
    pub access_token: String,
    /// When the token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a new access token with just the token string.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// Creates a new access token with expiration time.
    pub fn with_expiry(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Returns `true` if the token has expired.
    ///
    /// Returns `false` if expiration time is unknown.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() >= exp)
    }

    /// Returns `true` for an anonymous (empty) token. No `Authorization`
    /// header is sent for these.
    pub fn is_anonymous(&self) -> bool {
        self.access_token.is_empty()
    }
}

/// Supplies access tokens to the client.
///
/// The client calls `get_token` before every request; implementations cache
/// and renew as they see fit.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a valid access token.
    async fn get_token(&self) -> Result<AccessToken, AuthError>;
}

/// A provider that always returns the same token.
///
/// Pass an empty string for backends that serve public resources.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    /// Creates a provider for a fixed token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }

    /// Creates a provider that sends no credentials.
    pub fn anonymous() -> Self {
        Self::new("")
    }

    /// Creates a provider from a token that may expire.
    pub fn from_token(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<AccessToken, AuthError> {
        if self.token.is_expired() {
            return Err(AuthError::TokenExpired {
                message: "static token has expired".to_string(),
            });
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_returns_token() {
        let provider = StaticTokenProvider::new("abc");
        let token = provider.get_token().await.unwrap();
        assert_eq!(token.access_token, "abc");
        assert!(!token.is_anonymous());
    }

    #[tokio::test]
    async fn test_expired_static_token_fails() {
        let past = Utc::now() - chrono::Duration::hours(1);
        let provider = StaticTokenProvider::from_token(AccessToken::with_expiry("abc", past));
        assert!(matches!(
            provider.get_token().await,
            Err(AuthError::TokenExpired { .. })
        ));
    }

    #[test]
    fn test_anonymous_token() {
        assert!(AccessToken::new("").is_anonymous());
    }
}
