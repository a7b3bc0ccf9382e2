//! Ordering and windowing types for repository queries
//!
//! # Example
//!
//! ```rust
//! use entity_rest::repository::{OrderDirection, Pagination, SortKey};
//!
//! let pagination = Pagination::page(3, 20);
//! assert_eq!(pagination.offset, 40);
//!
//! let sort = vec![SortKey::desc("created_at"), SortKey::asc("name")];
//! assert_eq!(sort[0].direction, OrderDirection::Descending);
//! ```

use std::fmt;
use std::str::FromStr;

/// Direction for ordering results
///
/// # Example
///
/// ```rust
/// use entity_rest::repository::OrderDirection;
///
/// assert_eq!(format!("{}", OrderDirection::Ascending), "asc");
/// assert_eq!("DESC".parse::<OrderDirection>(), Ok(OrderDirection::Descending));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

impl FromStr for OrderDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(()),
        }
    }
}

/// One `(column, direction)` pair of a multi-key sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Column to order by
    pub column: String,
    /// Direction for this column
    pub direction: OrderDirection,
}

impl SortKey {
    /// Create a sort key
    pub fn new(column: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Ascending sort on `column`
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Ascending)
    }

    /// Descending sort on `column`
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Descending)
    }
}

/// Offset/limit window over a result set
///
/// # Example
///
/// ```rust
/// use entity_rest::repository::Pagination;
///
/// let first = Pagination::first_page(25);
/// assert_eq!(first.offset, 0);
/// assert_eq!(first.limit, 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: u64,
}

impl Pagination {
    /// Create new pagination parameters
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Create pagination for the first page with the given limit
    #[must_use]
    pub const fn first_page(limit: u64) -> Self {
        Self { offset: 0, limit }
    }

    /// Create pagination for a specific page number (1-indexed)
    ///
    /// Page `0` is treated as page `1`.
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        let offset = page_number.saturating_sub(1).saturating_mul(page_size);
        Self {
            offset,
            limit: page_size,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}
