//! Page type for paginated query results.

use crate::model::Record;

use super::PageRequest;

/// One page of results plus the total number of matching rows.
///
/// # Example
///
/// ```
/// use farmgate_lib::api::query::{Page, PageRequest};
///
/// let all: Vec<u32> = (0..25).collect();
/// let page = Page::from_slice(&all, &PageRequest::new(3, 10));
///
/// assert_eq!(page.data(), &[20, 21, 22, 23, 24]);
/// assert_eq!(page.total(), 25);
/// assert_eq!(page.total_pages(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R = Record> {
    data: Vec<R>,
    total: usize,
    page: usize,
    limit: usize,
}

impl<R> Page<R> {
    /// Creates a page from rows and the total count across all pages.
    pub fn new(data: Vec<R>, total: usize) -> Self {
        let limit = data.len().max(1);
        Self {
            data,
            total,
            page: 1,
            limit,
        }
    }

    /// Records which request this page answers.
    pub fn for_request(mut self, request: &PageRequest) -> Self {
        self.page = request.page();
        self.limit = request.limit();
        self
    }

    /// Returns the rows of this page.
    pub fn data(&self) -> &[R] {
        &self.data
    }

    /// Consumes the page and returns the rows.
    pub fn into_data(self) -> Vec<R> {
        self.data
    }

    /// Returns the total number of rows across all pages.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the 1-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the page size the page was requested with.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of pages, never less than 1.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit.max(1)).max(1)
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if pages after this one exist.
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Maps every row, keeping the paging information.
    pub fn map<U>(self, f: impl FnMut(R) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

impl<R: Clone> Page<R> {
    /// Cuts the requested page out of an in-memory set.
    pub fn from_slice(all: &[R], request: &PageRequest) -> Self {
        let range = request.offset().min(all.len())..(request.offset() + request.limit()).min(all.len());
        Page::new(all[range].to_vec(), all.len()).for_request(request)
    }
}
