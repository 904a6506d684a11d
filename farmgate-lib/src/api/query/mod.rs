//! Paged list queries.
//!
//! - [`PageRequest`] - what a table asks the backend for (page, limit,
//!   search text, field filters, sort)
//! - [`Page`] - one page of results with the total row count
//! - [`Direction`] - sort direction shared with the table layer

mod order;
mod page;
mod request;

pub use order::Direction;
pub use page::Page;
pub use request::ALL;
pub use request::PageRequest;
pub use request::is_inactive;
