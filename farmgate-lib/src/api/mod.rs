//! Backend API surface.
//!
//! The marketplace backend is a REST service; every dashboard screen talks
//! to it through [`MarketplaceClient`](crate::MarketplaceClient) CRUD calls.
//! Paged reads go through the [`PageSource`] seam so server-side tables can
//! be fed by the client, by an in-memory fixture or by any async closure.

mod crud;
mod source;
pub mod query;

pub use crud::ListResponse;
pub use source::FnPageSource;
pub use source::PageSource;
pub use source::ResourceSource;
pub use source::VecPageSource;
