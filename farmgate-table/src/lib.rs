//! Generic tabular data view
//!
//! A [`TableView`] composes declarative [`Column`]s, a [`FilterBar`] of
//! AND-ed predicates, single-column [`SortState`], [`Pagination`] and row
//! [`Selection`] over any [`TableRow`] type. It performs no I/O: user
//! interactions mutate its state and queue [`TableEvent`]s for the host.
//!
//! For server-side paging, [`RemoteTable`] drives a view from a
//! [`PageSource`](farmgate_lib::api::PageSource), keeping the last good page
//! on screen while a fetch is pending or after it fails.
//!
//! ```
//! use farmgate_lib::model::Record;
//! use farmgate_table::{Column, ColumnSet, Filter, FilterBar, TableView};
//!
//! let columns = ColumnSet::new(vec![
//!     Column::new("customer", "Customer").sortable(),
//!     Column::new("status", "Status"),
//! ])
//! .unwrap();
//! let filters = FilterBar::new()
//!     .with(Filter::search("search", ["customer"]))
//!     .with(Filter::select("status", "status"));
//!
//! let view = TableView::new(columns).with_filters(filters);
//! view.set_rows(vec![
//!     Record::with_id("orders", "1").set("customer", "Blue Fin").set("status", "pending"),
//!     Record::with_id("orders", "2").set("customer", "Salmon Co").set("status", "confirmed"),
//! ]);
//!
//! view.set_filter("status", "pending").unwrap();
//! assert_eq!(view.visible_ids(), vec!["1"]);
//! ```

mod column;
mod error;
mod events;
mod filter;
mod options;
mod pagination;
mod remote;
mod row;
mod selection;
mod sort;
mod view;

pub mod render;

pub use column::*;
pub use error::*;
pub use events::*;
pub use filter::*;
pub use options::*;
pub use pagination::*;
pub use remote::*;
pub use row::*;
pub use selection::*;
pub use sort::*;
pub use view::*;
