//! Column descriptors and column sets.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use farmgate_lib::api::query::Direction;
use farmgate_lib::model::Value;

use crate::error::TableError;
use crate::row::TableRow;

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Emphasis of a badge cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Success,
    Warning,
    Danger,
}

/// Rendered content of one cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Missing or blank value. Shown as the table placeholder.
    #[default]
    Empty,
    /// Plain text.
    Text(String),
    /// Short status label such as an order state.
    Badge { text: String, tone: Tone },
}

impl Cell {
    /// Creates a text cell; blank text becomes [`Cell::Empty`].
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text)
        }
    }

    /// Creates a badge cell.
    pub fn badge(text: impl Into<String>, tone: Tone) -> Self {
        Cell::Badge {
            text: text.into(),
            tone,
        }
    }

    /// Returns the text, or `None` for an empty cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Empty => None,
            Cell::Text(text) | Cell::Badge { text, .. } => Some(text),
        }
    }

    /// Returns the text or `placeholder`.
    pub fn display<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.as_text().unwrap_or(placeholder)
    }
}

impl From<Option<Value>> for Cell {
    fn from(value: Option<Value>) -> Self {
        value
            .as_ref()
            .and_then(Value::to_display)
            .map_or(Cell::Empty, Cell::Text)
    }
}

type HeaderFn = Arc<dyn Fn(Option<Direction>) -> String + Send + Sync>;
type CellFn<R> = Arc<dyn Fn(&R) -> Cell + Send + Sync>;
type SortKeyFn<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

/// Column header: fixed text or a function of the column's sort direction.
#[derive(Clone)]
pub enum Header {
    Text(String),
    Render(HeaderFn),
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Header::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Header::Render(_) => f.write_str("Render(..)"),
        }
    }
}

/// Column configuration.
///
/// A column maps a row to a [`Cell`]. By default the cell and the sort key
/// both come from [`TableRow::value`] under the column key; `cell` and
/// `sort_by` override them. Cell functions must be pure: row actions belong
/// in [`TableOptions::row_actions`](crate::TableOptions), not in cells.
///
/// # Examples
///
/// ```
/// use farmgate_lib::model::Record;
/// use farmgate_table::{Alignment, Cell, Column, Tone};
///
/// let columns: Vec<Column<Record>> = vec![
///     Column::new("customer", "Customer").sortable(),
///     Column::new("amount", "Amount").sortable().align(Alignment::Right),
///     Column::new("status", "Status").cell(|r: &Record| {
///         let status = r.display("status");
///         let tone = if status == "confirmed" { Tone::Success } else { Tone::Warning };
///         Cell::badge(status, tone)
///     }),
/// ];
/// ```
pub struct Column<R> {
    key: String,
    header: Header,
    cell: CellFn<R>,
    sort_key: SortKeyFn<R>,
    sortable: bool,
    hideable: bool,
    align: Alignment,
    width: Option<usize>,
}

impl<R: TableRow> Column<R> {
    /// Creates a column reading field `key`.
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        let key = key.into();
        let cell_key = key.clone();
        let sort_field = key.clone();
        Self {
            key,
            header: Header::Text(header.into()),
            cell: Arc::new(move |row: &R| Cell::from(row.value(&cell_key))),
            sort_key: Arc::new(move |row: &R| row.value(&sort_field).unwrap_or_default()),
            sortable: false,
            hideable: true,
            align: Alignment::Left,
            width: None,
        }
    }
}

impl<R> Column<R> {
    /// Renders the header with a function of the current sort direction.
    pub fn header_with<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<Direction>) -> String + Send + Sync + 'static,
    {
        self.header = Header::Render(Arc::new(f));
        self
    }

    /// Sets the cell function.
    pub fn cell<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> Cell + Send + Sync + 'static,
    {
        self.cell = Arc::new(f);
        self
    }

    /// Sets the value the column sorts by.
    pub fn sort_by<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'static,
    {
        self.sort_key = Arc::new(f);
        self
    }

    /// Makes the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Pins the column so the visibility menu cannot hide it.
    pub fn always_visible(mut self) -> Self {
        self.hideable = false;
        self
    }

    /// Sets the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Fixes the column width in terminal columns.
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width.max(1));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Header text given the column's current sort direction.
    pub fn header_text(&self, direction: Option<Direction>) -> String {
        match &self.header {
            Header::Text(text) => text.clone(),
            Header::Render(f) => f(direction),
        }
    }

    pub fn render_cell(&self, row: &R) -> Cell {
        (self.cell)(row)
    }

    pub fn sort_value(&self, row: &R) -> Value {
        (self.sort_key)(row)
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_hideable(&self) -> bool {
        self.hideable
    }

    pub fn alignment(&self) -> Alignment {
        self.align
    }

    pub fn fixed_width(&self) -> Option<usize> {
        self.width
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            cell: Arc::clone(&self.cell),
            sort_key: Arc::clone(&self.sort_key),
            sortable: self.sortable,
            hideable: self.hideable,
            align: self.align,
            width: self.width,
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("hideable", &self.hideable)
            .field("align", &self.align)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ColumnSet
// =============================================================================

/// Ordered columns with unique keys.
///
/// The set itself is fixed once built; only visibility changes at runtime.
pub struct ColumnSet<R> {
    columns: Vec<Column<R>>,
    hidden: HashSet<String>,
}

impl<R> ColumnSet<R> {
    /// Builds a set, rejecting duplicate keys.
    pub fn new(columns: Vec<Column<R>>) -> Result<Self, TableError> {
        if let Some(key) = Self::duplicate_keys(&columns).into_iter().next() {
            return Err(TableError::DuplicateColumn { key });
        }
        Ok(Self {
            columns,
            hidden: HashSet::new(),
        })
    }

    /// Returns every key that appears more than once, in first-seen order.
    pub fn duplicate_keys(columns: &[Column<R>]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for column in columns {
            if !seen.insert(column.key.as_str()) && !duplicates.contains(&column.key) {
                duplicates.push(column.key.clone());
            }
        }
        duplicates
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Looks up a column by key.
    pub fn get(&self, key: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// All columns, hidden ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Column<R>> {
        self.columns.iter()
    }

    /// Visible columns in order.
    pub fn visible(&self) -> impl Iterator<Item = &Column<R>> {
        self.columns
            .iter()
            .filter(|c| !self.hidden.contains(&c.key))
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.get(key).is_some() && !self.hidden.contains(key)
    }

    /// Keys of hidden columns, in column order.
    pub fn hidden_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| self.hidden.contains(&c.key))
            .map(|c| c.key.as_str())
            .collect()
    }

    /// Shows or hides a column. Returns `true` if visibility changed.
    pub fn set_visible(&mut self, key: &str, visible: bool) -> Result<bool, TableError> {
        let column = self.get(key).ok_or_else(|| TableError::UnknownColumn {
            key: key.to_string(),
        })?;
        if !visible && !column.hideable {
            return Err(TableError::NotHideable {
                key: key.to_string(),
            });
        }
        let changed = if visible {
            self.hidden.remove(key)
        } else {
            self.hidden.insert(key.to_string())
        };
        Ok(changed)
    }

    /// Flips a column's visibility. Returns the new visibility.
    pub fn toggle_visibility(&mut self, key: &str) -> Result<bool, TableError> {
        let visible = !self.is_visible(key);
        self.set_visible(key, visible)?;
        Ok(visible)
    }
}

impl<R> Clone for ColumnSet<R> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            hidden: self.hidden.clone(),
        }
    }
}

impl<R> fmt::Debug for ColumnSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSet")
            .field("columns", &self.columns)
            .field("hidden", &self.hidden)
            .finish()
    }
}
