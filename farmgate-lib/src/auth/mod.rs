//! Authentication
//!
//! Sign-in itself happens against the backend's auth endpoints; the client
//! only needs something that hands it a bearer token per request.

mod token;

pub use token::AccessToken;
pub use token::StaticTokenProvider;
pub use token::TokenProvider;
