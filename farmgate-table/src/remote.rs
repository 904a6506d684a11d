//! Server-side table driven by a [`PageSource`].
//!
//! Every fetch takes a ticket from a [`RequestSequencer`]. When it settles,
//! the result is applied only if no newer fetch has started and the table
//! has not been closed. While a fetch is pending, and after it fails, the
//! last good page stays on screen along with its page number.

use std::sync::Arc;
use std::sync::Mutex;

use farmgate_lib::api::PageSource;
use farmgate_lib::api::query::Direction;
use farmgate_lib::api::query::PageRequest;
use farmgate_lib::error::Error;
use farmgate_lib::rate_limit::RequestSequencer;
use tokio_util::sync::CancellationToken;

use crate::error::TableError;
use crate::filter::FilterValue;
use crate::pagination::Pagination;
use crate::row::TableRow;
use crate::view::TableView;

/// How a fetch ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The page was applied to the view.
    Loaded,
    /// A newer fetch started first; this result was discarded.
    Superseded,
    /// The table was closed; nothing was applied.
    Cancelled,
    /// The fetch failed. The view keeps its rows and shows the error.
    Failed(Error),
}

enum Fetched {
    Done(FetchOutcome),
    /// The page was clamped; fetch again.
    PageMoved,
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchOutcome::Loaded)
    }
}

/// A [`TableView`] fed page by page from a [`PageSource`].
///
/// # Example
///
/// ```ignore
/// let table = RemoteTable::new(view, client.resource("orders"));
/// table.refresh().await;
/// table.set_filter("status", "pending").await?;
/// println!("{}", table.view().render());
/// ```
pub struct RemoteTable<R: TableRow, S> {
    view: TableView<R>,
    source: Arc<S>,
    sequencer: RequestSequencer,
    cancel: CancellationToken,
    /// Page and page size of the rows on screen.
    loaded: Arc<Mutex<Option<Pagination>>>,
}

impl<R: TableRow, S> Clone for RemoteTable<R, S> {
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            source: Arc::clone(&self.source),
            sequencer: self.sequencer.clone(),
            cancel: self.cancel.clone(),
            loaded: Arc::clone(&self.loaded),
        }
    }
}

impl<R, S> RemoteTable<R, S>
where
    R: TableRow,
    S: PageSource<R>,
{
    /// Wraps `view`, switching it to server-side paging.
    pub fn new(view: TableView<R>, source: S) -> Self {
        Self {
            view: view.server_side(),
            source: Arc::new(source),
            sequencer: RequestSequencer::new(),
            cancel: CancellationToken::new(),
            loaded: Arc::new(Mutex::new(None)),
        }
    }

    pub fn view(&self) -> &TableView<R> {
        &self.view
    }

    /// The request the current view state maps to.
    pub fn request(&self) -> PageRequest {
        let pagination = self.view.pagination();
        let mut request = PageRequest::new(pagination.page(), pagination.page_size());
        if let Some((key, direction)) = self.view.sort() {
            request = request.sort(key, direction);
        }
        self.view.filters().apply_to_request(request)
    }

    /// Fetches the page for the current state.
    ///
    /// If the reported total no longer reaches the requested page, the view
    /// moves to the last page and that page is fetched. The page only moves
    /// down, so this settles at page 1 at the latest.
    pub async fn refresh(&self) -> FetchOutcome {
        loop {
            match self.fetch().await {
                Fetched::Done(outcome) => return outcome,
                Fetched::PageMoved => {}
            }
        }
    }

    async fn fetch(&self) -> Fetched {
        if self.cancel.is_cancelled() {
            return Fetched::Done(FetchOutcome::Cancelled);
        }

        let ticket = self.sequencer.issue();
        let request = self.request();
        log::debug!(
            "[remote] fetch #{} page {} limit {}",
            ticket.value(),
            request.page(),
            request.limit()
        );
        self.view.set_loading(true);

        let result = tokio::select! {
            _ = self.cancel.cancelled() => return Fetched::Done(FetchOutcome::Cancelled),
            result = self.source.fetch_page(request) => result,
        };

        if self.cancel.is_cancelled() {
            return Fetched::Done(FetchOutcome::Cancelled);
        }
        if !self.sequencer.is_current(ticket) {
            log::debug!("[remote] discarding stale response #{}", ticket.value());
            return Fetched::Done(FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                let total = page.total();
                let moved = self.view.set_page_data(page.into_data(), total);
                self.remember(self.view.pagination());
                if moved {
                    log::info!(
                        "[remote] total shrank to {}, fetching page {}",
                        total,
                        self.view.page()
                    );
                    return Fetched::PageMoved;
                }
                self.view.set_loading(false);
                self.view.set_error(None);
                Fetched::Done(FetchOutcome::Loaded)
            }
            Err(e) => {
                log::warn!("[remote] fetch #{} failed: {}", ticket.value(), e);
                self.view.set_loading(false);
                if let Some(loaded) = self.loaded() {
                    self.view.restore_page(loaded);
                }
                self.view.set_error(Some(e.to_string()));
                Fetched::Done(FetchOutcome::Failed(e))
            }
        }
    }

    fn remember(&self, pagination: Pagination) {
        if let Ok(mut loaded) = self.loaded.lock() {
            *loaded = Some(pagination);
        }
    }

    fn loaded(&self) -> Option<Pagination> {
        self.loaded.lock().ok().and_then(|g| *g)
    }

    /// Go to `page` and fetch it.
    pub async fn set_page(&self, page: usize) -> FetchOutcome {
        self.view.set_page(page);
        self.refresh().await
    }

    pub async fn next_page(&self) -> FetchOutcome {
        self.view.next_page();
        self.refresh().await
    }

    pub async fn prev_page(&self) -> FetchOutcome {
        self.view.prev_page();
        self.refresh().await
    }

    /// Change the page size and fetch page 1.
    pub async fn set_page_size(&self, page_size: usize) -> FetchOutcome {
        self.view.set_page_size(page_size);
        self.refresh().await
    }

    /// Set a filter and fetch page 1 of the new result.
    pub async fn set_filter(
        &self,
        key: &str,
        value: impl Into<FilterValue>,
    ) -> Result<FetchOutcome, TableError> {
        self.view.set_filter(key, value)?;
        Ok(self.refresh().await)
    }

    pub async fn set_search(&self, text: &str) -> Result<FetchOutcome, TableError> {
        self.view.set_search(text)?;
        Ok(self.refresh().await)
    }

    /// Header click: cycle the sort and fetch page 1.
    pub async fn toggle_sort(&self, key: &str) -> Result<FetchOutcome, TableError> {
        self.view.toggle_sort(key)?;
        Ok(self.refresh().await)
    }

    pub async fn set_sort(&self, key: &str, direction: Direction) -> Result<FetchOutcome, TableError> {
        self.view.set_sort(key, direction)?;
        Ok(self.refresh().await)
    }

    /// Stops the table. Pending and later fetches settle as
    /// [`FetchOutcome::Cancelled`] without touching the view.
    pub fn close(&self) {
        self.sequencer.invalidate();
        self.cancel.cancel();
        self.view.set_loading(false);
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
