//! Table display options.

use farmgate_lib::model::PLACEHOLDER;

use crate::pagination::DEFAULT_PAGE_SIZE;

/// A per-row action offered by the host, such as "edit" or "approve".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActionKind {
    /// Identifier sent back in [`TableEvent::RowAction`](crate::TableEvent).
    pub kind: String,
    /// Menu label.
    pub label: String,
}

impl RowActionKind {
    pub fn new(kind: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            label: label.into(),
        }
    }
}

/// Toggles and defaults for a table.
///
/// # Example
///
/// ```
/// use farmgate_table::{RowActionKind, TableOptions};
///
/// let options = TableOptions::new()
///     .show_row_selection(true)
///     .show_export(true)
///     .page_size(20)
///     .row_action(RowActionKind::new("approve", "Approve"));
/// assert!(options.has_row_action("approve"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub show_search: bool,
    pub show_column_visibility: bool,
    pub show_pagination: bool,
    pub show_row_selection: bool,
    pub show_export: bool,
    pub show_add_button: bool,
    /// Text shown for empty cells.
    pub placeholder: String,
    /// Initial page size.
    pub page_size: usize,
    /// Page sizes offered in the footer.
    pub page_size_options: Vec<usize>,
    /// Actions offered on every row.
    pub row_actions: Vec<RowActionKind>,
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_search(mut self, show: bool) -> Self {
        self.show_search = show;
        self
    }

    pub fn show_column_visibility(mut self, show: bool) -> Self {
        self.show_column_visibility = show;
        self
    }

    pub fn show_pagination(mut self, show: bool) -> Self {
        self.show_pagination = show;
        self
    }

    pub fn show_row_selection(mut self, show: bool) -> Self {
        self.show_row_selection = show;
        self
    }

    pub fn show_export(mut self, show: bool) -> Self {
        self.show_export = show;
        self
    }

    pub fn show_add_button(mut self, show: bool) -> Self {
        self.show_add_button = show;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size_options(mut self, sizes: impl IntoIterator<Item = usize>) -> Self {
        self.page_size_options = sizes.into_iter().filter(|s| *s > 0).collect();
        self
    }

    pub fn row_action(mut self, action: RowActionKind) -> Self {
        self.row_actions.push(action);
        self
    }

    pub fn has_row_action(&self, kind: &str) -> bool {
        self.row_actions.iter().any(|a| a.kind == kind)
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            show_search: true,
            show_column_visibility: true,
            show_pagination: true,
            show_row_selection: false,
            show_export: false,
            show_add_button: false,
            placeholder: PLACEHOLDER.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: vec![10, 20, 50, 100],
            row_actions: Vec::new(),
        }
    }
}
