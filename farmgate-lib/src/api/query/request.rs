//! Page request parameters.

use super::Direction;

/// Sentinel filter value meaning "no restriction".
pub const ALL: &str = "all";

/// What a server-side table asks for: page, limit, search text, field
/// filters and sort.
///
/// Empty filter values and the `"all"` sentinel are dropped, so the backend
/// only sees active restrictions.
///
/// # Example
///
/// ```
/// use farmgate_lib::api::query::{Direction, PageRequest};
///
/// let request = PageRequest::new(2, 20)
///     .search("salmon")
///     .filter("status", "confirmed")
///     .filter("region", "all")
///     .sort("createdAt", Direction::Desc);
///
/// let pairs = request.query_pairs();
/// assert!(pairs.contains(&("status".to_string(), "confirmed".to_string())));
/// assert!(!pairs.iter().any(|(k, _)| k == "region"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
    search: Option<String>,
    filters: Vec<(String, String)>,
    sort: Option<(String, Direction)>,
}

impl PageRequest {
    /// Creates a request for a 1-based page. Zero values are raised to 1.
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search: None,
            filters: Vec::new(),
            sort: None,
        }
    }

    /// Sets the free-text search.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = if text.trim().is_empty() { None } else { Some(text) };
        self
    }

    /// Adds a field filter. Empty values and `"all"` are ignored.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !is_inactive(&value) {
            self.filters.push((field.into(), value));
        }
        self
    }

    /// Sets the sort column and direction.
    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort = Some((field.into(), direction));
        self
    }

    /// Returns the 1-based page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns the page size.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the 0-based index of the first row on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }

    /// Returns the search text, if any.
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns the active field filters.
    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    /// Returns the sort, if any.
    pub fn sort_by(&self) -> Option<(&str, Direction)> {
        self.sort.as_ref().map(|(k, d)| (k.as_str(), *d))
    }

    /// Same filters and sort, different page.
    pub fn with_page(&self, page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            ..self.clone()
        }
    }

    /// Builds the query string pairs for the list endpoint.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        if let Some((field, direction)) = &self.sort {
            pairs.push(("sortBy".to_string(), field.clone()));
            pairs.push(("order".to_string(), direction.as_str().to_string()));
        }
        pairs
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// Returns `true` for filter values that mean "no restriction".
pub fn is_inactive(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(ALL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_page_and_limit_raised() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 1);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_blank_search_dropped() {
        let request = PageRequest::new(1, 10).search("   ");
        assert_eq!(request.search_text(), None);
    }

    #[test]
    fn test_with_page_keeps_filters() {
        let request = PageRequest::new(1, 10)
            .filter("status", "pending")
            .sort("amount", Direction::Asc);
        let next = request.with_page(2, 5);
        assert_eq!(next.page(), 2);
        assert_eq!(next.limit(), 5);
        assert_eq!(next.filters(), request.filters());
        assert_eq!(next.sort_by(), Some(("amount", Direction::Asc)));
    }

    #[test]
    fn test_query_pairs_order() {
        let pairs = PageRequest::new(3, 25).sort("name", Direction::Desc).query_pairs();
        assert_eq!(pairs[0], ("page".to_string(), "3".to_string()));
        assert_eq!(pairs[1], ("limit".to_string(), "25".to_string()));
        assert_eq!(pairs[2], ("sortBy".to_string(), "name".to_string()));
        assert_eq!(pairs[3], ("order".to_string(), "desc".to_string()));
    }
}
