//! Authentication error types

/// Errors that can occur while obtaining an access token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token is available for the session.
    #[error("Not signed in")]
    NotSignedIn,

    /// Access token expired and could not be renewed.
    #[error("Token expired: {message}")]
    TokenExpired { message: String },

    /// The token provider failed for another reason.
    #[error("Token provider error: {0}")]
    Provider(String),
}
