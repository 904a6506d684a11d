//! TableView: the composed table state.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use farmgate_lib::api::query::Direction;

use crate::column::Column;
use crate::column::ColumnSet;
use crate::error::TableError;
use crate::events::TableEvent;
use crate::filter::FilterBar;
use crate::filter::FilterValue;
use crate::options::TableOptions;
use crate::pagination::Pagination;
use crate::render;
use crate::render::FrameColumn;
use crate::render::FrameRow;
use crate::render::TableFrame;
use crate::row::TableRow;
use crate::selection::CheckState;
use crate::selection::Selection;
use crate::selection::SelectionPolicy;
use crate::sort::SortState;
use crate::sort::sort_indices;

/// Where rows are filtered, sorted and sliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingMode {
    /// All rows are held in memory; the view does the work.
    #[default]
    Client,
    /// Rows are the current page as returned by the backend, which has
    /// already applied filters and sort.
    Server,
}

/// Internal state for the TableView.
struct TableViewInner<R> {
    columns: ColumnSet<R>,
    rows: Vec<R>,
    filters: FilterBar<R>,
    sort: SortState,
    pagination: Pagination,
    selection: Selection,
    options: TableOptions,
    mode: PagingMode,
    /// Filtered and sorted row indices. In server mode, every row in order.
    order: Vec<usize>,
    loading: bool,
    error: Option<String>,
    events: Vec<TableEvent>,
}

impl<R: TableRow> TableViewInner<R> {
    fn recompute(&mut self) {
        match self.mode {
            PagingMode::Client => {
                let rows = &self.rows;
                let filters = &self.filters;
                let mut order: Vec<usize> =
                    (0..rows.len()).filter(|&i| filters.matches(&rows[i])).collect();

                if let Some((key, direction)) = self.sort.active()
                    && let Some(column) = self.columns.get(key)
                {
                    sort_indices(rows, &mut order, column, direction);
                }

                self.order = order;
                if self.pagination.set_total(self.order.len()) {
                    log::debug!("[table] page clamped to {}", self.pagination.page());
                }
            }
            PagingMode::Server => {
                self.order = (0..self.rows.len()).collect();
            }
        }
        self.apply_selection_policy();
    }

    fn apply_selection_policy(&mut self) {
        let dropped = match self.selection.selection_policy() {
            SelectionPolicy::PersistById if self.mode == PagingMode::Client => {
                let present: HashSet<String> = self.rows.iter().map(TableRow::id).collect();
                self.selection.retain(|id| present.contains(id))
            }
            SelectionPolicy::PersistById => false,
            SelectionPolicy::VisibleOnly => {
                let visible: HashSet<String> = self.page_ids().into_iter().collect();
                self.selection.retain(|id| visible.contains(id))
            }
        };
        if dropped {
            self.push(TableEvent::SelectionChanged {
                count: self.selection.count(),
            });
        }
    }

    fn page_indices(&self) -> &[usize] {
        match self.mode {
            PagingMode::Client => self.pagination.slice(&self.order),
            PagingMode::Server => &self.order,
        }
    }

    fn page_ids(&self) -> Vec<String> {
        self.page_indices()
            .iter()
            .map(|&i| self.rows[i].id())
            .collect()
    }

    fn page_changed(&mut self) {
        self.push(TableEvent::PageChanged {
            page: self.pagination.page(),
            page_size: self.pagination.page_size(),
        });
    }

    /// Server results depend on the query, so any query change goes back to
    /// the first page.
    fn query_changed(&mut self) {
        if self.mode == PagingMode::Server && self.pagination.page() != 1 {
            self.pagination.set_page(1);
            self.page_changed();
        }
        self.recompute();
    }

    fn push(&mut self, event: TableEvent) {
        log::debug!("[table] {:?}", event);
        self.events.push(event);
    }
}

/// A table over rows of type `R`.
///
/// `TableView<R>` owns:
/// - the column set and its visibility
/// - the rows (all of them, or the current server page)
/// - the filter bar, sort, pagination and selection state
/// - a queue of [`TableEvent`]s for the host
///
/// Cheap to clone; clones share the same state, so a fetch task can write
/// results while the host reads them.
pub struct TableView<R: TableRow> {
    inner: Arc<RwLock<TableViewInner<R>>>,
    dirty: Arc<AtomicBool>,
}

impl<R: TableRow> Clone for TableView<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<R: TableRow> TableView<R> {
    /// Create a client-side table with default options.
    pub fn new(columns: ColumnSet<R>) -> Self {
        let options = TableOptions::default();
        let inner = TableViewInner {
            columns,
            rows: Vec::new(),
            filters: FilterBar::new(),
            sort: SortState::new(),
            pagination: Pagination::new(options.page_size),
            selection: Selection::multi(),
            options,
            mode: PagingMode::Client,
            order: Vec::new(),
            loading: false,
            error: None,
            events: Vec::new(),
        };
        Self {
            inner: Arc::new(RwLock::new(inner)),
            dirty: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Set the display options. Resets the page size to theirs.
    pub fn with_options(self, options: TableOptions) -> Self {
        self.write(|g| {
            g.pagination.set_page_size(options.page_size);
            g.options = options;
            g.recompute();
        });
        self
    }

    /// Set the filter bar.
    pub fn with_filters(self, filters: FilterBar<R>) -> Self {
        self.write(|g| {
            g.filters = filters;
            g.recompute();
        });
        self
    }

    /// Set the selection mode and policy.
    pub fn with_selection(self, selection: Selection) -> Self {
        self.write(|g| {
            g.selection = selection;
            g.recompute();
        });
        self
    }

    /// Start sorted by `key`.
    pub fn with_sort(self, key: &str, direction: Direction) -> Result<Self, TableError> {
        self.set_sort(key, direction)?;
        self.take_events();
        Ok(self)
    }

    /// Switch to server-side paging.
    pub fn server_side(self) -> Self {
        self.write(|g| {
            g.mode = PagingMode::Server;
            g.recompute();
        });
        self
    }

    fn read<T>(&self, f: impl FnOnce(&TableViewInner<R>) -> T) -> Option<T> {
        self.inner.read().ok().map(|g| f(&*g))
    }

    fn write<T>(&self, f: impl FnOnce(&mut TableViewInner<R>) -> T) -> Option<T> {
        let mut guard = self.inner.write().ok()?;
        let out = f(&mut *guard);
        self.dirty.store(true, Ordering::SeqCst);
        Some(out)
    }

    pub fn mode(&self) -> PagingMode {
        self.read(|g| g.mode).unwrap_or_default()
    }

    pub fn options(&self) -> TableOptions {
        self.read(|g| g.options.clone()).unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Replace all rows (client-side).
    pub fn set_rows(&self, rows: Vec<R>) {
        self.write(|g| {
            g.rows = rows;
            g.recompute();
        });
    }

    /// Replace the current page (server-side). `total` counts rows across
    /// all pages.
    ///
    /// Returns true if `total` no longer reaches the current page and the
    /// page was pulled back to the last one. The rows then belong to a page
    /// that no longer exists and the caller should fetch the new page.
    pub fn set_page_data(&self, rows: Vec<R>, total: usize) -> bool {
        self.write(|g| {
            g.rows = rows;
            let moved = g.pagination.set_total(total);
            if moved {
                log::debug!("[table] page clamped to {}", g.pagination.page());
                g.page_changed();
            }
            g.recompute();
            moved
        })
        .unwrap_or(false)
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.read(|g| g.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All rows held, unfiltered.
    pub fn rows(&self) -> Vec<R> {
        self.read(|g| g.rows.clone()).unwrap_or_default()
    }

    /// Rows on the current page, in display order.
    pub fn visible_rows(&self) -> Vec<R> {
        self.read(|g| {
            g.page_indices()
                .iter()
                .map(|&i| g.rows[i].clone())
                .collect()
        })
        .unwrap_or_default()
    }

    /// Ids of the rows on the current page, in display order.
    pub fn visible_ids(&self) -> Vec<String> {
        self.read(|g| g.page_ids()).unwrap_or_default()
    }

    /// Rows passing the filters on every page, in display order.
    pub fn filtered_rows(&self) -> Vec<R> {
        self.read(|g| g.order.iter().map(|&i| g.rows[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Finds a held row by id.
    pub fn row(&self, id: &str) -> Option<R> {
        self.read(|g| g.rows.iter().find(|r| r.id() == id).cloned())
            .flatten()
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Set a filter value. Returns `true` if it changed.
    pub fn set_filter(&self, key: &str, value: impl Into<FilterValue>) -> Result<bool, TableError> {
        let value = value.into();
        self.write(|g| -> Result<bool, TableError> {
            let changed = g.filters.set_value(key, value)?;
            if changed {
                g.push(TableEvent::FilterChanged {
                    key: key.to_string(),
                });
                g.query_changed();
            }
            Ok(changed)
        })
        .unwrap_or(Ok(false))
    }

    /// Set the search box text (the first search filter).
    pub fn set_search(&self, text: &str) -> Result<bool, TableError> {
        let key = self
            .read(|g| g.filters.search_key().map(String::from))
            .flatten()
            .ok_or_else(|| TableError::UnknownFilter {
                key: "search".to_string(),
            })?;
        self.set_filter(&key, text)
    }

    /// Clear every filter. Returns `true` if any was active.
    pub fn clear_filters(&self) -> bool {
        self.write(|g| {
            let changed = g.filters.clear_all();
            if changed {
                g.query_changed();
            }
            changed
        })
        .unwrap_or(false)
    }

    pub fn filter_value(&self, key: &str) -> Option<FilterValue> {
        self.read(|g| g.filters.get(key).map(|f| f.value().clone()))
            .flatten()
    }

    /// A copy of the filter bar.
    pub fn filters(&self) -> FilterBar<R> {
        self.read(|g| g.filters.clone()).unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Sort
    // -------------------------------------------------------------------------

    /// Header click on `key`: advances its sort cycle.
    pub fn toggle_sort(&self, key: &str) -> Result<Option<Direction>, TableError> {
        self.write(|g| -> Result<Option<Direction>, TableError> {
            check_sortable(&g.columns, key)?;
            let direction = g.sort.toggle(key);
            g.push(TableEvent::SortChanged {
                key: key.to_string(),
                direction,
            });
            g.query_changed();
            Ok(direction)
        })
        .unwrap_or(Ok(None))
    }

    /// Sort by `key` in `direction`.
    pub fn set_sort(&self, key: &str, direction: Direction) -> Result<(), TableError> {
        self.write(|g| -> Result<(), TableError> {
            check_sortable(&g.columns, key)?;
            if g.sort.direction_for(key) != Some(direction) {
                g.sort.set(key, direction);
                g.push(TableEvent::SortChanged {
                    key: key.to_string(),
                    direction: Some(direction),
                });
                g.query_changed();
            }
            Ok(())
        })
        .unwrap_or(Ok(()))
    }

    pub fn clear_sort(&self) {
        self.write(|g| {
            if let Some((key, _)) = g.sort.active() {
                let key = key.to_string();
                g.sort.clear();
                g.push(TableEvent::SortChanged {
                    key,
                    direction: None,
                });
                g.query_changed();
            }
        });
    }

    pub fn sort(&self) -> Option<(String, Direction)> {
        self.read(|g| g.sort.active().map(|(k, d)| (k.to_string(), d)))
            .flatten()
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Go to `page`, clamped into range. Returns the page shown.
    pub fn set_page(&self, page: usize) -> usize {
        self.write(|g| {
            let before = g.pagination.page();
            let page = g.pagination.set_page(page);
            if page != before {
                g.page_changed();
                g.recompute();
            }
            page
        })
        .unwrap_or(1)
    }

    pub fn next_page(&self) -> bool {
        let page = self.page();
        self.set_page(page + 1) != page
    }

    pub fn prev_page(&self) -> bool {
        let page = self.page();
        self.set_page(page.saturating_sub(1)) != page
    }

    /// Change the page size. Always returns to page 1.
    pub fn set_page_size(&self, page_size: usize) {
        self.write(|g| {
            g.pagination.set_page_size(page_size);
            g.page_changed();
            g.recompute();
        });
    }

    /// Put the page and page size back to `pagination`, keeping the current
    /// total. Used when a server fetch for another page fails.
    pub fn restore_page(&self, pagination: Pagination) {
        self.write(|g| {
            let current = g.pagination;
            if current.page() == pagination.page() && current.page_size() == pagination.page_size() {
                return;
            }
            g.pagination.set_page_size(pagination.page_size());
            g.pagination.set_page(pagination.page());
            g.page_changed();
            g.recompute();
        });
    }

    pub fn pagination(&self) -> Pagination {
        self.read(|g| g.pagination).unwrap_or_default()
    }

    pub fn page(&self) -> usize {
        self.pagination().page()
    }

    pub fn page_size(&self) -> usize {
        self.pagination().page_size()
    }

    /// Rows passing the filters (client) or reported by the server.
    pub fn total(&self) -> usize {
        self.pagination().total()
    }

    pub fn total_pages(&self) -> usize {
        self.pagination().total_pages()
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Toggle the checkbox of a row on the current page.
    ///
    /// Returns false when row selection is hidden or the row is not on the
    /// page.
    pub fn toggle_row(&self, id: &str) -> bool {
        self.write(|g| {
            if !g.options.show_row_selection || !g.page_ids().iter().any(|v| v == id) {
                return false;
            }
            let changed = g.selection.toggle(id);
            if changed {
                g.push(TableEvent::SelectionChanged {
                    count: g.selection.count(),
                });
            }
            changed
        })
        .unwrap_or(false)
    }

    /// Header checkbox: select (or deselect) every row on the current page.
    pub fn toggle_all_on_page(&self) -> bool {
        self.write(|g| {
            if !g.options.show_row_selection {
                return false;
            }
            let ids = g.page_ids();
            let changed = g.selection.toggle_all(&ids);
            if changed {
                g.push(TableEvent::SelectionChanged {
                    count: g.selection.count(),
                });
            }
            changed
        })
        .unwrap_or(false)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.read(|g| g.selection.is_selected(id)).unwrap_or(false)
    }

    pub fn selection_count(&self) -> usize {
        self.read(|g| g.selection.count()).unwrap_or(0)
    }

    /// Selected ids, sorted.
    pub fn selected_ids(&self) -> Vec<String> {
        self.read(|g| g.selection.ids()).unwrap_or_default()
    }

    /// Held rows that are selected, in data order.
    pub fn selected_rows(&self) -> Vec<R> {
        self.read(|g| {
            g.rows
                .iter()
                .filter(|r| g.selection.is_selected(&r.id()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
    }

    /// Header checkbox state for the current page.
    pub fn check_state(&self) -> CheckState {
        self.read(|g| g.selection.check_state(&g.page_ids()))
            .unwrap_or(CheckState::Unchecked)
    }

    pub fn clear_selection(&self) -> bool {
        self.write(|g| {
            let changed = g.selection.clear();
            if changed {
                g.push(TableEvent::SelectionChanged { count: 0 });
            }
            changed
        })
        .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Show or hide a column from the visibility menu. Returns the new
    /// visibility.
    pub fn toggle_column(&self, key: &str) -> Result<bool, TableError> {
        self.write(|g| -> Result<bool, TableError> {
            let visible = g.columns.toggle_visibility(key)?;
            g.push(TableEvent::ColumnVisibilityChanged {
                key: key.to_string(),
                visible,
            });
            Ok(visible)
        })
        .unwrap_or(Ok(false))
    }

    pub fn visible_columns(&self) -> Vec<Column<R>> {
        self.read(|g| g.columns.visible().cloned().collect())
            .unwrap_or_default()
    }

    pub fn columns(&self) -> Option<ColumnSet<R>> {
        self.read(|g| g.columns.clone())
    }

    // -------------------------------------------------------------------------
    // Host actions
    // -------------------------------------------------------------------------

    /// Trigger a registered row action on a row of the current page.
    pub fn row_action(&self, kind: &str, id: &str) -> Result<bool, TableError> {
        self.write(|g| {
            if !g.options.has_row_action(kind) {
                return Err(TableError::UnknownAction {
                    kind: kind.to_string(),
                });
            }
            if !g.page_ids().iter().any(|v| v == id) {
                return Ok(false);
            }
            g.push(TableEvent::RowAction {
                kind: kind.to_string(),
                id: id.to_string(),
            });
            Ok(true)
        })
        .unwrap_or(Ok(false))
    }

    /// Export button: emits the selected ids, or every filtered row when
    /// nothing is selected.
    pub fn request_export(&self) -> bool {
        self.write(|g| {
            if !g.options.show_export {
                return false;
            }
            let ids = if g.selection.count() > 0 {
                g.order
                    .iter()
                    .map(|&i| g.rows[i].id())
                    .filter(|id| g.selection.is_selected(id))
                    .collect()
            } else {
                g.order.iter().map(|&i| g.rows[i].id()).collect()
            };
            g.push(TableEvent::Export { ids });
            true
        })
        .unwrap_or(false)
    }

    /// Add button.
    pub fn request_add(&self) -> bool {
        self.write(|g| {
            if !g.options.show_add_button {
                return false;
            }
            g.push(TableEvent::AddRequested);
            true
        })
        .unwrap_or(false)
    }

    /// Drain queued events.
    pub fn take_events(&self) -> Vec<TableEvent> {
        self.inner
            .write()
            .map(|mut g| std::mem::take(&mut g.events))
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Load state
    // -------------------------------------------------------------------------

    pub fn set_loading(&self, loading: bool) {
        self.write(|g| g.loading = loading);
    }

    pub fn is_loading(&self) -> bool {
        self.read(|g| g.loading).unwrap_or(false)
    }

    /// Set or clear the error banner. Rows are left untouched.
    pub fn set_error(&self, error: Option<String>) {
        self.write(|g| g.error = error);
    }

    pub fn error(&self) -> Option<String> {
        self.read(|g| g.error.clone()).flatten()
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Whether state changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Snapshot of everything the renderer needs.
    pub fn frame(&self) -> TableFrame {
        self.read(|g| {
            let columns: Vec<&Column<R>> = g.columns.visible().collect();
            let placeholder = g.options.placeholder.as_str();

            let frame_columns = columns
                .iter()
                .map(|c| {
                    let sort = g.sort.direction_for(c.key());
                    FrameColumn {
                        key: c.key().to_string(),
                        title: c.header_text(sort),
                        align: c.alignment(),
                        width: c.fixed_width(),
                        sortable: c.is_sortable(),
                        sort,
                    }
                })
                .collect();

            let rows = g
                .page_indices()
                .iter()
                .map(|&i| {
                    let row = &g.rows[i];
                    let id = row.id();
                    FrameRow {
                        selected: g.selection.is_selected(&id),
                        cells: columns
                            .iter()
                            .map(|c| c.render_cell(row).display(placeholder).to_string())
                            .collect(),
                        id,
                    }
                })
                .collect();

            let active_filters = g
                .filters
                .active()
                .map(|f| (f.key().to_string(), describe(f.value())))
                .collect();

            TableFrame {
                columns: frame_columns,
                rows,
                show_selection: g.options.show_row_selection,
                check_state: g.selection.check_state(&g.page_ids()),
                active_filters,
                show_pagination: g.options.show_pagination,
                page: g.pagination.page(),
                total_pages: g.pagination.total_pages(),
                total: g.pagination.total(),
                page_size: g.pagination.page_size(),
                selected: g.selection.count(),
                loading: g.loading,
                error: g.error.clone(),
                row_actions: g.options.row_actions.iter().map(|a| a.label.clone()).collect(),
            }
        })
        .unwrap_or_default()
    }

    /// Renders the table as text.
    pub fn render(&self) -> String {
        render::render(&self.frame())
    }

    /// Filtered rows on every page as CSV, visible columns only.
    ///
    /// A server-side view only holds the current page, so only that page is
    /// exported. Use [`export_csv_rows`](Self::export_csv_rows) to export
    /// rows gathered across pages.
    pub fn export_csv(&self) -> String {
        self.export_csv_rows(&self.filtered_rows())
    }

    /// `rows` as CSV with the visible columns of this view.
    pub fn export_csv_rows(&self, rows: &[R]) -> String {
        self.read(|g| {
            let columns: Vec<&Column<R>> = g.columns.visible().collect();
            let header: Vec<String> = columns.iter().map(|c| c.header_text(None)).collect();
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .map(|c| c.render_cell(row).as_text().unwrap_or("").to_string())
                        .collect()
                })
                .collect();
            render::csv(&header, &rows)
        })
        .unwrap_or_default()
    }
}

impl<R: TableRow> fmt::Debug for TableView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("TableView");
        if let Ok(g) = self.inner.read() {
            s.field("mode", &g.mode)
                .field("columns", &g.columns)
                .field("rows", &g.rows.len())
                .field("pagination", &g.pagination)
                .field("loading", &g.loading)
                .field("error", &g.error);
        }
        s.finish_non_exhaustive()
    }
}

fn check_sortable<R>(columns: &ColumnSet<R>, key: &str) -> Result<(), TableError> {
    match columns.get(key) {
        None => Err(TableError::UnknownColumn {
            key: key.to_string(),
        }),
        Some(c) if !c.is_sortable() => Err(TableError::NotSortable {
            key: key.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

fn describe(value: &FilterValue) -> String {
    match value {
        FilterValue::Text(text) => text.trim().to_string(),
        FilterValue::DateRange { from, to } => format!(
            "{}..{}",
            from.map(|d| d.to_string()).unwrap_or_default(),
            to.map(|d| d.to_string()).unwrap_or_default()
        ),
    }
}

#[cfg(test)]
mod tests {
    use farmgate_lib::model::Record;

    use super::*;
    use crate::filter::Filter;
    use crate::options::RowActionKind;

    fn farmers(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                Record::with_id("farmers", format!("f-{}", i))
                    .set("name", format!("Farm {:02}", i))
                    .set("region", if i % 2 == 0 { "north" } else { "south" })
            })
            .collect()
    }

    fn view() -> TableView<Record> {
        let columns = ColumnSet::new(vec![
            Column::new("name", "Name").sortable(),
            Column::new("region", "Region"),
        ])
        .unwrap();
        let view = TableView::new(columns)
            .with_options(
                TableOptions::new()
                    .show_row_selection(true)
                    .show_export(true)
                    .row_action(RowActionKind::new("approve", "Approve")),
            )
            .with_filters(
                FilterBar::new()
                    .with(Filter::search("search", ["name"]))
                    .with(Filter::select("region", "region")),
            );
        view.set_rows(farmers(25));
        view.take_events();
        view
    }

    #[test]
    fn test_events_for_sort_and_page() {
        let view = view();
        view.toggle_sort("name").unwrap();
        view.set_page(2);

        assert_eq!(
            view.take_events(),
            vec![
                TableEvent::SortChanged {
                    key: "name".into(),
                    direction: Some(Direction::Asc)
                },
                TableEvent::PageChanged {
                    page: 2,
                    page_size: 10
                },
            ]
        );
        assert!(view.take_events().is_empty());
    }

    #[test]
    fn test_sort_errors() {
        let view = view();
        assert_eq!(
            view.toggle_sort("region"),
            Err(TableError::NotSortable { key: "region".into() })
        );
        assert_eq!(
            view.toggle_sort("phone"),
            Err(TableError::UnknownColumn { key: "phone".into() })
        );
    }

    #[test]
    fn test_toggle_row_requires_visible_row() {
        let view = view();
        assert!(view.toggle_row("f-3"));
        assert!(!view.toggle_row("f-20"));
        assert_eq!(view.selected_ids(), vec!["f-3".to_string()]);
    }

    #[test]
    fn test_row_action_event() {
        let view = view();
        assert_eq!(view.row_action("approve", "f-1"), Ok(true));
        assert_eq!(
            view.row_action("delete", "f-1"),
            Err(TableError::UnknownAction { kind: "delete".into() })
        );
        assert_eq!(
            view.take_events(),
            vec![TableEvent::RowAction {
                kind: "approve".into(),
                id: "f-1".into()
            }]
        );
    }

    #[test]
    fn test_export_prefers_selection() {
        let view = view();
        view.set_filter("region", "south").unwrap();
        view.take_events();

        assert!(view.request_export());
        let Some(TableEvent::Export { ids }) = view.take_events().pop() else {
            panic!("no export event");
        };
        assert_eq!(ids.len(), 12);

        view.toggle_row("f-3");
        view.request_export();
        assert_eq!(
            view.take_events().pop(),
            Some(TableEvent::Export {
                ids: vec!["f-3".into()]
            })
        );
    }

    #[test]
    fn test_visible_only_policy_prunes_on_page_change() {
        let view = view().with_selection(Selection::multi().policy(SelectionPolicy::VisibleOnly));
        view.toggle_all_on_page();
        assert_eq!(view.selection_count(), 10);

        view.set_page(2);
        assert_eq!(view.selection_count(), 0);
    }

    #[test]
    fn test_persist_policy_drops_removed_rows() {
        let view = view();
        view.toggle_row("f-1");
        view.set_page(2);
        assert!(view.is_selected("f-1"));

        view.set_rows(farmers(1));
        assert!(!view.is_selected("f-1"));
    }

    #[test]
    fn test_search_without_search_filter() {
        let columns = ColumnSet::new(vec![Column::<Record>::new("name", "Name")]).unwrap();
        let view = TableView::new(columns);
        assert_eq!(
            view.set_search("x"),
            Err(TableError::UnknownFilter { key: "search".into() })
        );
    }

    #[test]
    fn test_debug_shows_page_state() {
        let debug = format!("{:?}", view());
        assert!(debug.starts_with("TableView"));
        assert!(debug.contains("rows: 25"));
        assert!(debug.contains("mode: Client"));
    }

    #[test]
    fn test_export_csv_quotes() {
        let columns = ColumnSet::new(vec![Column::<Record>::new("name", "Name")]).unwrap();
        let view = TableView::new(columns);
        view.set_rows(vec![Record::with_id("restaurants", "1").set("name", "Fish, Chips \"& Co\"")]);
        assert_eq!(view.export_csv(), "Name\n\"Fish, Chips \"\"& Co\"\"\"\n");
    }
}
