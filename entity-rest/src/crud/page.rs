//! Paginated results

use serde::{Deserialize, Serialize};

/// Pagination block of a list result
///
/// Exactly one mode per result. Serialized with a `type` tag:
///
/// ```json
/// {"type": "LENGTH_AWARE", "page": 1, "per_page": 20, "total_pages": 3, "total_items": 42}
/// {"type": "CURSOR", "per_page": 20, "has_more": true, "next_cursor": "0190..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageInfo {
    /// Offset pagination with full counts
    #[serde(rename = "LENGTH_AWARE")]
    LengthAware {
        /// One-based page number
        page: u64,
        /// Requested page size
        per_page: u64,
        /// `ceil(total_items / per_page)`
        total_pages: u64,
        /// Rows matching the request
        total_items: u64,
    },
    /// Keyset pagination without counts
    #[serde(rename = "CURSOR")]
    Cursor {
        /// Requested page size
        per_page: u64,
        /// Whether rows exist beyond this page
        has_more: bool,
        /// Cursor for the next page; `None` exactly when `has_more` is false
        next_cursor: Option<String>,
    },
}

impl PageInfo {
    /// Length-aware block for zero-based `page_index`
    pub fn length_aware(page_index: u64, per_page: u64, total_items: u64) -> Self {
        Self::LengthAware {
            page: page_index.saturating_add(1),
            per_page,
            total_pages: total_pages(total_items, per_page),
            total_items,
        }
    }

    /// Cursor block; `next_cursor` is dropped unless `has_more`
    pub fn cursor(per_page: u64, has_more: bool, next_cursor: Option<String>) -> Self {
        Self::Cursor {
            per_page,
            has_more,
            next_cursor: next_cursor.filter(|_| has_more),
        }
    }

    /// Page size of either mode
    pub fn per_page(&self) -> u64 {
        match self {
            Self::LengthAware { per_page, .. } | Self::Cursor { per_page, .. } => *per_page,
        }
    }

    /// Total matching rows, known only in length-aware mode
    pub fn total_items(&self) -> Option<u64> {
        match self {
            Self::LengthAware { total_items, .. } => Some(*total_items),
            Self::Cursor { .. } => None,
        }
    }
}

/// Ceiling division, zero pages for zero rows
pub fn total_pages(total_items: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total_items.div_ceil(per_page)
}

/// One page of rows plus its pagination block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// Rows, in the order the repository returned them
    pub data: Vec<T>,
    /// Pagination metadata
    pub pagination: PageInfo,
}

impl<T> PaginatedResult<T> {
    /// Create a result
    pub fn new(data: Vec<T>, pagination: PageInfo) -> Self {
        Self { data, pagination }
    }

    /// Empty cursor page with no successor
    pub fn empty_cursor(per_page: u64) -> Self {
        Self::new(Vec::new(), PageInfo::cursor(per_page, false, None))
    }

    /// Transform every row, keeping order and pagination
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
