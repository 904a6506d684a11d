//! Page arithmetic shared by client- and server-side tables.

use std::ops::Range;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Pagination state.
///
/// `page` is 1-based and always within `1..=total_pages()`; `total_pages()`
/// is at least 1 so an empty table still shows "page 1 of 1".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Rows across all pages.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// Updates the row count, pulling `page` back into range if the last
    /// pages disappeared. Returns true if the page moved.
    pub fn set_total(&mut self, total: usize) -> bool {
        self.total = total;
        self.clamp()
    }

    /// Moves to `page`, clamped into range. Returns the page actually shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.total_pages());
        self.page
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn next_page(&mut self) -> bool {
        let before = self.page;
        self.set_page(self.page + 1) != before
    }

    pub fn prev_page(&mut self) -> bool {
        let before = self.page;
        self.set_page(self.page.saturating_sub(1)) != before
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages()
    }

    /// Index of the first row on the page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    /// Row indices on the current page, `[(page-1)*size, page*size)` cut at
    /// `total`.
    pub fn range(&self) -> Range<usize> {
        let start = self.offset().min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    /// The current page of `rows`, where `rows` holds every filtered row.
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let start = self.offset().min(rows.len());
        let end = (start + self.page_size).min(rows.len());
        &rows[start..end]
    }

    fn clamp(&mut self) -> bool {
        let before = self.page;
        self.set_page(self.page);
        self.page != before
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_page_three() {
        let rows: Vec<usize> = (0..45).collect();
        let mut pagination = Pagination::new(10);
        pagination.set_total(rows.len());
        pagination.set_page(3);

        assert_eq!(pagination.slice(&rows), &rows[20..30]);
        assert_eq!(pagination.range(), 20..30);
    }

    #[test]
    fn test_short_last_page() {
        let rows: Vec<usize> = (0..25).collect();
        let mut pagination = Pagination::new(10);
        pagination.set_total(rows.len());
        pagination.set_page(3);
        assert_eq!(pagination.slice(&rows), &[20, 21, 22, 23, 24]);
        assert!(pagination.is_last());
        assert!(!pagination.next_page());
    }

    #[test]
    fn test_clamp_on_shrink() {
        let mut pagination = Pagination::new(10);
        pagination.set_total(50);
        pagination.set_page(4);

        assert!(pagination.set_total(15));
        assert_eq!(pagination.total_pages(), 2);
        assert_eq!(pagination.page(), 2);
    }

    #[test]
    fn test_page_size_resets_page() {
        let mut pagination = Pagination::new(10);
        pagination.set_total(100);
        pagination.set_page(7);
        pagination.set_page_size(25);
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.total_pages(), 4);
    }

    #[test]
    fn test_empty_has_one_page() {
        let mut pagination = Pagination::new(10);
        assert_eq!(pagination.total_pages(), 1);
        assert_eq!(pagination.set_page(5), 1);
        assert_eq!(pagination.range(), 0..0);
        assert!(!pagination.prev_page());
    }
}
