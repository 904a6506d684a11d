//! Retry policy for transient backend failures.

use std::time::Duration;

use crate::error::ApiError;

/// How the client retries rate limiting (429), server errors (5xx) and
/// network failures.
///
/// Dashboards favour a quick answer over persistence, so the defaults are
/// short: two retries starting at 250ms, capped at 5s.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use farmgate_lib::rate_limit::RetryConfig;
///
/// let patient = RetryConfig::default()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(500));
/// assert_eq!(patient.delay_for(2), Duration::from_secs(2));
///
/// let never = RetryConfig::no_retry();
/// assert_eq!(never.max_retries, 0);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Whether to retry on HTTP 429.
    pub retry_on_429: bool,
    /// Whether to retry on HTTP 5xx.
    pub retry_on_5xx: bool,
    /// Whether to retry on network errors and timeouts.
    pub retry_on_network: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            retry_on_429: true,
            retry_on_5xx: true,
            retry_on_network: true,
        }
    }
}

impl RetryConfig {
    /// Creates a config with all retries disabled.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            retry_on_429: false,
            retry_on_5xx: false,
            retry_on_network: false,
            ..Default::default()
        }
    }

    /// Sets the maximum number of retries.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Sets the initial delay between retries.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Returns the backoff before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Decides whether a failed attempt should be retried.
    ///
    /// `attempt` counts the retries already made.
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        match error {
            ApiError::Http { status: 429, .. } => self.retry_on_429,
            ApiError::Http { status, .. } if (500..600).contains(status) => {
                self.retry_on_5xx && error.is_retryable()
            }
            ApiError::Network(_) | ApiError::Timeout(_) => self.retry_on_network,
            _ => false,
        }
    }
}
