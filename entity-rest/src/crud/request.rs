//! List query requests

use std::collections::BTreeMap;

use crate::repository::{FilterValue, SortKey};

/// Page size used when none is given
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// A list/count request as the CRUD core sees it
///
/// `page` is a zero-based page index. `page_size` is always at least 1; the
/// constructors and [`QueryRequest::with_page_size`] enforce it.
///
/// # Example
///
/// ```rust
/// use entity_rest::crud::QueryRequest;
/// use entity_rest::repository::SortKey;
///
/// let request = QueryRequest::new(10)
///     .with_search("jo")
///     .with_filter("status", "ACTIVE")
///     .with_sort(SortKey::desc("created_at"));
///
/// assert_eq!(request.search_term(), Some("jo"));
/// assert_eq!(request.offset(), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Free-text search term
    pub search: Option<String>,
    /// Column filters, applied as equality predicates
    pub filters: BTreeMap<String, FilterValue>,
    /// Zero-based page index
    pub page: u64,
    /// Rows per page, never zero
    pub page_size: u64,
    /// Multi-key ordering, first key most significant
    pub sort: Vec<SortKey>,
    /// Opaque cursor from a previous page's `next_cursor`
    pub cursor: Option<String>,
}

impl QueryRequest {
    /// First page of `page_size` rows, unfiltered
    pub fn new(page_size: u64) -> Self {
        Self {
            search: None,
            filters: BTreeMap::new(),
            page: 0,
            page_size: page_size.max(1),
            sort: Vec::new(),
            cursor: None,
        }
    }

    /// Set the search term
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Add a filter
    #[must_use]
    pub fn with_filter(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(column.into(), value.into());
        self
    }

    /// Set the zero-based page index
    #[must_use]
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    /// Set the page size, raising zero to one
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Append a sort key
    #[must_use]
    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    /// Set the cursor
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// The search term as given, or `None` if absent or blank
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|term| !term.trim().is_empty())
    }

    /// Rows skipped before this page in offset mode
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.page_size)
    }
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
