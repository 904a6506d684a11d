//! Filter bar: independent predicates combined with AND.
//!
//! The host owns filter values and pushes them in with `set_value`; the bar
//! keeps no other state. An empty value or the `"all"` sentinel means the
//! predicate always passes. A search filter ORs across its fields, and the
//! result is ANDed with every other active filter.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use farmgate_lib::api::query::PageRequest;
use farmgate_lib::api::query::is_inactive;
use farmgate_lib::model::Value;
use nucleo_matcher::Config;
use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;
use nucleo_matcher::pattern::AtomKind;
use nucleo_matcher::pattern::CaseMatching;
use nucleo_matcher::pattern::Normalization;
use nucleo_matcher::pattern::Pattern;

use crate::error::TableError;
use crate::row::TableRow;

/// How a search filter matches text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Case-insensitive substring.
    #[default]
    Substring,
    /// Fuzzy subsequence match (nucleo).
    Fuzzy,
}

/// Current value of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    /// Inclusive date bounds; either side may be open.
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl FilterValue {
    /// Returns `false` when the filter should let every row through.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Text(text) => !is_inactive(text),
            FilterValue::DateRange { from, to } => from.is_some() || to.is_some(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(text) => Some(text),
            FilterValue::DateRange { .. } => None,
        }
    }
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Text(String::new())
    }
}

impl From<&str> for FilterValue {
    fn from(text: &str) -> Self {
        FilterValue::Text(text.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(text: String) -> Self {
        FilterValue::Text(text)
    }
}

impl From<(Option<NaiveDate>, Option<NaiveDate>)> for FilterValue {
    fn from((from, to): (Option<NaiveDate>, Option<NaiveDate>)) -> Self {
        FilterValue::DateRange { from, to }
    }
}

type CustomFn<R> = Arc<dyn Fn(&R, &str) -> bool + Send + Sync>;

/// What a filter tests.
pub enum FilterKind<R> {
    /// Text search across several fields (OR).
    Search { fields: Vec<String>, mode: MatchMode },
    /// Equality against one field, e.g. an order status dropdown.
    Select { field: String, options: Vec<String> },
    /// Date field within an inclusive range.
    DateRange { field: String },
    /// Host-defined predicate over the row and the text value.
    Custom(CustomFn<R>),
}

impl<R> Clone for FilterKind<R> {
    fn clone(&self) -> Self {
        match self {
            FilterKind::Search { fields, mode } => FilterKind::Search {
                fields: fields.clone(),
                mode: *mode,
            },
            FilterKind::Select { field, options } => FilterKind::Select {
                field: field.clone(),
                options: options.clone(),
            },
            FilterKind::DateRange { field } => FilterKind::DateRange {
                field: field.clone(),
            },
            FilterKind::Custom(f) => FilterKind::Custom(Arc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for FilterKind<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Search { fields, mode } => f
                .debug_struct("Search")
                .field("fields", fields)
                .field("mode", mode)
                .finish(),
            FilterKind::Select { field, options } => f
                .debug_struct("Select")
                .field("field", field)
                .field("options", options)
                .finish(),
            FilterKind::DateRange { field } => {
                f.debug_struct("DateRange").field("field", field).finish()
            }
            FilterKind::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One predicate in the filter bar.
pub struct Filter<R> {
    key: String,
    kind: FilterKind<R>,
    value: FilterValue,
}

impl<R> Filter<R> {
    /// Searches `fields`, matching if any of them contains the text.
    pub fn search<I, S>(key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            key,
            FilterKind::Search {
                fields: fields.into_iter().map(Into::into).collect(),
                mode: MatchMode::Substring,
            },
        )
    }

    /// Matches rows whose `field` equals the selected option.
    pub fn select(key: impl Into<String>, field: impl Into<String>) -> Self {
        Self::with_kind(
            key,
            FilterKind::Select {
                field: field.into(),
                options: Vec::new(),
            },
        )
    }

    /// Matches rows whose `field` date is within the range.
    pub fn date_range(key: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: FilterKind::DateRange {
                field: field.into(),
            },
            value: FilterValue::DateRange {
                from: None,
                to: None,
            },
        }
    }

    /// Host-defined predicate. It is only called while the value is active.
    pub fn custom<F>(key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&R, &str) -> bool + Send + Sync + 'static,
    {
        Self::with_kind(key, FilterKind::Custom(Arc::new(f)))
    }

    fn with_kind(key: impl Into<String>, kind: FilterKind<R>) -> Self {
        Self {
            key: key.into(),
            kind,
            value: FilterValue::default(),
        }
    }

    /// Switches a search filter to fuzzy matching.
    pub fn fuzzy(mut self) -> Self {
        if let FilterKind::Search { mode, .. } = &mut self.kind {
            *mode = MatchMode::Fuzzy;
        }
        self
    }

    /// Sets the choices offered by a select filter.
    pub fn options<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let FilterKind::Select { options, .. } = &mut self.kind {
            *options = choices.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Sets the initial value.
    pub fn with_value(mut self, value: impl Into<FilterValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> &FilterKind<R> {
        &self.kind
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Replaces the value. Returns `true` if it changed.
    pub fn set_value(&mut self, value: impl Into<FilterValue>) -> bool {
        let value = value.into();
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    /// Resets the value so the filter passes everything.
    pub fn clear(&mut self) -> bool {
        let empty = match self.kind {
            FilterKind::DateRange { .. } => FilterValue::DateRange {
                from: None,
                to: None,
            },
            _ => FilterValue::default(),
        };
        self.set_value(empty)
    }

    pub fn is_active(&self) -> bool {
        self.value.is_active()
    }
}

impl<R: TableRow> Filter<R> {
    /// Evaluates the predicate. Inactive filters always pass.
    pub fn evaluate(&self, row: &R) -> bool {
        if !self.is_active() {
            return true;
        }
        match (&self.kind, &self.value) {
            (FilterKind::Search { fields, mode }, FilterValue::Text(query)) => {
                let haystacks = fields
                    .iter()
                    .filter_map(|f| row.value(f).as_ref().and_then(Value::to_display));
                match mode {
                    MatchMode::Substring => {
                        let needle = query.trim().to_lowercase();
                        haystacks
                            .into_iter()
                            .any(|h| h.to_lowercase().contains(&needle))
                    }
                    MatchMode::Fuzzy => fuzzy_matches(query.trim(), haystacks),
                }
            }
            (FilterKind::Select { field, .. }, FilterValue::Text(expected)) => row
                .value(field)
                .as_ref()
                .and_then(match_text)
                .is_some_and(|actual| actual.eq_ignore_ascii_case(expected.trim())),
            (FilterKind::DateRange { field }, FilterValue::DateRange { from, to }) => {
                let Some(date) = row.value(field).as_ref().and_then(date_of) else {
                    return false;
                };
                from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
            }
            (FilterKind::Custom(f), FilterValue::Text(text)) => f(row, text),
            (kind, value) => {
                log::warn!("[filter] '{}' {:?} cannot use {:?}", self.key, kind, value);
                true
            }
        }
    }
}

impl<R> Clone for Filter<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            kind: self.kind.clone(),
            value: self.value.clone(),
        }
    }
}

impl<R> fmt::Debug for Filter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .finish()
    }
}

/// Raw text used for equality: booleans as `true`/`false`, the rest as
/// displayed.
fn match_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::String(s) => Some(s.trim().to_string()),
        other => other.to_display(),
    }
}

fn date_of(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::DateTime(dt) => Some(dt.date_naive()),
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
                chrono::DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
        }
        _ => None,
    }
}

fn fuzzy_matches(query: &str, haystacks: impl Iterator<Item = String>) -> bool {
    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::new(
        query,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
    );
    let mut buf = Vec::new();
    haystacks.into_iter().any(|label| {
        let haystack = Utf32Str::new(&label, &mut buf);
        pattern.score(haystack, &mut matcher).is_some()
    })
}

// =============================================================================
// FilterBar
// =============================================================================

/// The set of filters shown above a table.
pub struct FilterBar<R> {
    filters: Vec<Filter<R>>,
}

impl<R> FilterBar<R> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Adds a filter (builder style). A later filter with a key already in
    /// the bar is dropped with a warning; use [`push`](Self::push) to get the
    /// error instead.
    pub fn with(mut self, filter: Filter<R>) -> Self {
        if let Err(e) = self.push(filter) {
            log::warn!("[filter] {}", e);
        }
        self
    }

    /// Adds a filter, rejecting duplicate keys.
    pub fn push(&mut self, filter: Filter<R>) -> Result<(), TableError> {
        if self.get(&filter.key).is_some() {
            return Err(TableError::DuplicateFilter { key: filter.key });
        }
        self.filters.push(filter);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Filter<R>> {
        self.filters.iter().find(|f| f.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter<R>> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filters that currently restrict rows.
    pub fn active(&self) -> impl Iterator<Item = &Filter<R>> {
        self.filters.iter().filter(|f| f.is_active())
    }

    /// The first search filter, which backs the table's search box.
    pub fn search_key(&self) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| matches!(f.kind, FilterKind::Search { .. }))
            .map(|f| f.key.as_str())
    }

    /// Sets a filter's value. Returns `true` if it changed.
    pub fn set_value(&mut self, key: &str, value: impl Into<FilterValue>) -> Result<bool, TableError> {
        let filter = self
            .filters
            .iter_mut()
            .find(|f| f.key == key)
            .ok_or_else(|| TableError::UnknownFilter {
                key: key.to_string(),
            })?;
        Ok(filter.set_value(value))
    }

    /// Clears every filter. Returns `true` if any was active.
    pub fn clear_all(&mut self) -> bool {
        self.filters
            .iter_mut()
            .fold(false, |changed, f| f.clear() || changed)
    }

    /// Encodes active filters onto a server request.
    ///
    /// The search filter becomes `search`, select and custom filters become
    /// `field=value`, and date ranges become `{field}From` / `{field}To`
    /// (`YYYY-MM-DD`).
    pub fn apply_to_request(&self, mut request: PageRequest) -> PageRequest {
        let search_key = self.search_key();
        for filter in self.active() {
            match (&filter.kind, &filter.value) {
                (FilterKind::Search { .. }, FilterValue::Text(text))
                    if Some(filter.key.as_str()) == search_key =>
                {
                    request = request.search(text.trim());
                }
                (FilterKind::Select { field, .. }, FilterValue::Text(text)) => {
                    request = request.filter(field, text.trim());
                }
                (FilterKind::DateRange { field }, FilterValue::DateRange { from, to }) => {
                    if let Some(from) = from {
                        request = request.filter(format!("{}From", field), from.to_string());
                    }
                    if let Some(to) = to {
                        request = request.filter(format!("{}To", field), to.to_string());
                    }
                }
                (_, FilterValue::Text(text)) => {
                    request = request.filter(&filter.key, text.trim());
                }
                _ => {}
            }
        }
        request
    }
}

impl<R: TableRow> FilterBar<R> {
    /// `true` iff every active filter accepts the row.
    pub fn matches(&self, row: &R) -> bool {
        self.filters.iter().all(|f| f.evaluate(row))
    }
}

impl<R> Default for FilterBar<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for FilterBar<R> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
        }
    }
}

impl<R> fmt::Debug for FilterBar<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.filters).finish()
    }
}
