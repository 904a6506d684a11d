//! Main MarketplaceClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use url::Url;

use crate::api::ResourceSource;
use crate::auth::TokenProvider;
use crate::error::ApiError;
use crate::error::Error;
use crate::rate_limit::ActionGuard;
use crate::rate_limit::ConcurrencyLimiter;
use crate::rate_limit::RetryConfig;

/// Client for the marketplace REST backend.
///
/// Cheap to clone (uses `Arc` internally) and safe to share across tasks.
///
/// # Example
///
/// ```ignore
/// use farmgate_lib::{MarketplaceClient, auth::StaticTokenProvider};
///
/// let client = MarketplaceClient::builder()
///     .url("https://api.farmgate.example/api")
///     .token_provider(StaticTokenProvider::new("my-token"))
///     .build()?;
///
/// let orders = client.list("orders", &PageRequest::new(1, 10)).await?;
/// ```
#[derive(Clone)]
pub struct MarketplaceClient {
    inner: Arc<MarketplaceClientInner>,
}

struct MarketplaceClientInner {
    base_url: Url,
    token_provider: Arc<dyn TokenProvider>,
    http_client: Client,
    timeout: Option<Duration>,
    retry_config: RetryConfig,
    concurrency_limiter: ConcurrencyLimiter,
    actions: ActionGuard,
}

impl MarketplaceClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> MarketplaceClientBuilder<Missing, Missing> {
        MarketplaceClientBuilder::new()
    }

    /// Returns the base URL of the backend.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the in-flight guard shared by every clone of this client.
    pub fn actions(&self) -> &ActionGuard {
        &self.inner.actions
    }

    /// Returns a page source for a resource such as `orders`.
    pub fn resource(&self, resource: impl Into<String>) -> ResourceSource {
        ResourceSource::new(self.clone(), resource)
    }

    /// Builds `{base}/{segments...}`. Segments may contain `/`.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(
                segments
                    .iter()
                    .flat_map(|s| s.split('/'))
                    .filter(|s| !s.is_empty()),
            );
        Ok(url)
    }

    /// Sends a request, retrying transient failures per the retry config.
    ///
    /// Non-success statuses come back as [`ApiError::Http`].
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, Error> {
        let _permit = self.inner.concurrency_limiter.acquire().await?;
        let retry_config = &self.inner.retry_config;
        let mut attempt = 0;

        loop {
            let result = self.send_once(method.clone(), url.clone(), body).await;

            let error = match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let retry_after = parse_retry_after(&response);
                    let body = response.text().await.unwrap_or_default();
                    let error = ApiError::from_body(status, &body);
                    if status == 429 && !retry_config.should_retry(&error, attempt) {
                        return Err(Error::RateLimit { retry_after });
                    }
                    if status == 429
                        && let Some(wait) = retry_after
                    {
                        log::warn!("[client] {} {} rate limited, waiting {:?}", method, url, wait);
                        tokio::time::sleep(wait.min(retry_config.max_delay)).await;
                        attempt += 1;
                        continue;
                    }
                    error
                }
                Err(Error::Api(error)) => error,
                Err(other) => return Err(other),
            };

            if !retry_config.should_retry(&error, attempt) {
                return Err(Error::Api(error));
            }

            let delay = retry_config.delay_for(attempt);
            log::warn!(
                "[client] {} {} failed ({}), retry {} in {:?}",
                method,
                url,
                error,
                attempt + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One attempt, no retry logic.
    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, Error> {
        let token = self.inner.token_provider.get_token().await?;

        log::debug!("[client] {} {}", method, url);
        let mut request = self.inner.http_client.request(method, url);

        if !token.is_anonymous() {
            request = request.bearer_auth(&token.access_token);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Api(ApiError::Timeout(self.inner.timeout.unwrap_or_default()))
            } else {
                Error::Api(ApiError::Network(e))
            }
        })
    }
}

/// Parses the Retry-After header value (seconds).
fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("Retry-After")?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`MarketplaceClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile
/// time.
///
/// # Required Fields
///
/// - `url` - The backend base URL, e.g. `https://api.farmgate.example/api`
/// - `token_provider` - A [`TokenProvider`] implementation
pub struct MarketplaceClientBuilder<U, P> {
    url: U,
    token_provider: P,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_config: RetryConfig,
    max_concurrency: usize,
    http_client: Option<Client>,
}

impl MarketplaceClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            token_provider: Missing,
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: None,
            retry_config: RetryConfig::default(),
            max_concurrency: ConcurrencyLimiter::default().limit(),
            http_client: None,
        }
    }
}

impl Default for MarketplaceClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> MarketplaceClientBuilder<Missing, P> {
    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> MarketplaceClientBuilder<Set<String>, P> {
        MarketplaceClientBuilder {
            url: Set(url.into()),
            token_provider: self.token_provider,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            retry_config: self.retry_config,
            max_concurrency: self.max_concurrency,
            http_client: self.http_client,
        }
    }
}

impl<U> MarketplaceClientBuilder<U, Missing> {
    /// Sets the token provider for authentication.
    pub fn token_provider<T: TokenProvider + 'static>(
        self,
        provider: T,
    ) -> MarketplaceClientBuilder<U, Set<Arc<dyn TokenProvider>>> {
        MarketplaceClientBuilder {
            url: self.url,
            token_provider: Set(Arc::new(provider) as Arc<dyn TokenProvider>),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            retry_config: self.retry_config,
            max_concurrency: self.max_concurrency,
            http_client: self.http_client,
        }
    }
}

impl<U, P> MarketplaceClientBuilder<U, P> {
    /// Sets the per-request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout, applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the retry policy.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Caps the number of simultaneous requests.
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl MarketplaceClientBuilder<Set<String>, Set<Arc<dyn TokenProvider>>> {
    /// Builds the [`MarketplaceClient`].
    ///
    /// Fails if the URL does not parse or cannot carry path segments.
    pub fn build(self) -> Result<MarketplaceClient, Error> {
        let base_url = Url::parse(&self.url.0).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.url.0, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(self.url.0).into());
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::Network)?
            }
        };

        Ok(MarketplaceClient {
            inner: Arc::new(MarketplaceClientInner {
                base_url,
                token_provider: self.token_provider.0,
                http_client,
                timeout: self.timeout,
                retry_config: self.retry_config,
                concurrency_limiter: ConcurrencyLimiter::new(self.max_concurrency),
                actions: ActionGuard::new(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    fn client(url: &str) -> MarketplaceClient {
        MarketplaceClient::builder()
            .url(url)
            .token_provider(StaticTokenProvider::anonymous())
            .build()
            .unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let client = client("https://api.example.com/api/v1/");
        let url = client.endpoint(&["orders", "o-1"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v1/orders/o-1");
    }

    #[test]
    fn test_endpoint_splits_nested_resource() {
        let client = client("https://api.example.com");
        let url = client.endpoint(&["admin/farmers"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/admin/farmers");
    }

    #[test]
    fn test_build_rejects_bad_url() {
        let result = MarketplaceClient::builder()
            .url("not a url")
            .token_provider(StaticTokenProvider::anonymous())
            .build();
        assert!(matches!(result, Err(Error::Api(ApiError::InvalidUrl(_)))));
    }
}
