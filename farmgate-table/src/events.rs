//! Events the table emits to its host.
//!
//! The view never calls back into the host. Interactions queue events that
//! the host drains with [`TableView::take_events`](crate::TableView::take_events)
//! after each input.

use farmgate_lib::api::query::Direction;

/// An event emitted by a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// The page or page size changed. Server-side hosts fetch this page.
    PageChanged { page: usize, page_size: usize },
    /// The sort column or direction changed. `direction` is `None` when the
    /// sort was cleared.
    SortChanged {
        key: String,
        direction: Option<Direction>,
    },
    /// A filter value changed.
    FilterChanged { key: String },
    /// The set of selected rows changed.
    SelectionChanged { count: usize },
    /// A column was shown or hidden.
    ColumnVisibilityChanged { key: String, visible: bool },
    /// Export requested for these row ids.
    Export { ids: Vec<String> },
    /// The add button was pressed.
    AddRequested,
    /// A registered row action was triggered on a row.
    RowAction { kind: String, id: String },
}
