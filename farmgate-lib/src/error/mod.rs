//! Error types

mod api;
mod auth;
mod cart;
mod field;
mod validation;

use std::time::Duration;

pub use api::*;
pub use auth::*;
pub use cart::*;
pub use field::*;
pub use validation::*;

/// Top-level error returned by client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backend or transport failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Token acquisition failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A cart mutation was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// A record field was missing or had the wrong type.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Input failed validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The same action already has a request in flight.
    #[error("Action '{action}' is already in progress")]
    Busy { action: String },

    /// The request was cancelled before it settled.
    #[error("Request cancelled")]
    Cancelled,

    /// The backend kept rate limiting after all retries.
    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimit { retry_after: Option<Duration> },

    /// JSON encoding or decoding failed outside of a response body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` for failures the user can recover from by retrying.
    ///
    /// Dashboards show these as a transient notification and keep their
    /// current rows.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Api(api) => api.is_retryable() || api.status_code().is_some(),
            Error::Busy { .. } | Error::Cancelled | Error::RateLimit { .. } => true,
            Error::Validation(_) | Error::Cart(_) => true,
            Error::Auth(_) | Error::Field(_) | Error::Json(_) => false,
        }
    }
}
