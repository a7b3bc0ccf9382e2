//! Query parameters for list and count endpoints
//!
//! The wire format is a flat query string. Five keys are reserved; every
//! other key is a column filter:
//!
//! | key      | meaning                                         |
//! |----------|-------------------------------------------------|
//! | `q`      | free-text search                                |
//! | `cursor` | `next_cursor` of a previous page                |
//! | `page`   | one-based page number                           |
//! | `size`   | page size, clamped to `[1, max_page_size]`      |
//! | `sort`   | `column,desc;other,asc`                         |
//!
//! Malformed `page` or `size` values fall back to their defaults instead of
//! failing the request.
//!
//! # Example
//!
//! ```rust
//! use entity_rest::config::PaginationConfig;
//! use entity_rest::handlers::ListQuery;
//!
//! let params = [
//!     ("q", "jo"),
//!     ("page", "3"),
//!     ("size", "500"),
//!     ("status", "ACTIVE"),
//! ];
//! let request = ListQuery::parse(params).into_request(&PaginationConfig::default());
//!
//! assert_eq!(request.search_term(), Some("jo"));
//! assert_eq!(request.page, 2);
//! assert_eq!(request.page_size, 100);
//! assert!(request.filters.contains_key("status"));
//! ```

use std::collections::BTreeMap;

use crate::config::PaginationConfig;
use crate::crud::QueryRequest;
use crate::repository::{OrderDirection, SortKey};

/// Reserved query keys
pub const RESERVED_KEYS: [&str; 5] = ["q", "cursor", "page", "size", "sort"];

/// Parsed list query, before limits are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Free-text search
    pub q: Option<String>,
    /// Cursor from a previous page
    pub cursor: Option<String>,
    /// One-based page number
    pub page: Option<u64>,
    /// Requested page size
    pub size: Option<u64>,
    /// Sort keys in significance order
    pub sort: Vec<SortKey>,
    /// Every non-reserved key, as sent
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// Split raw query pairs into reserved parameters and filters
    ///
    /// Blank values are treated as absent. A repeated key keeps its last value.
    /// The search term is kept untrimmed; every other value is trimmed.
    pub fn parse<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();

        for (key, value) in params {
            let key = key.as_ref();
            let raw = value.as_ref();
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "q" => query.q = Some(raw.to_string()),
                "cursor" => query.cursor = Some(value.to_string()),
                "page" => query.page = parse_number(key, value),
                "size" => query.size = parse_number(key, value),
                "sort" => query.sort = parse_sort(value),
                _ => {
                    query.filters.insert(key.to_string(), value.to_string());
                }
            }
        }

        query
    }

    /// Zero-based page index; `page=0` and `page=1` are both the first page
    pub fn page_index(&self) -> u64 {
        self.page.unwrap_or(1).saturating_sub(1)
    }

    /// Apply configured limits and build the core's request
    pub fn into_request(self, config: &PaginationConfig) -> QueryRequest {
        let page = self.page_index();
        let page_size = config.page_size(self.size);

        let mut request = QueryRequest::new(page_size).with_page(page);
        request.search = self.q;
        request.cursor = self.cursor;
        request.sort = self.sort;
        request.filters = self
            .filters
            .into_iter()
            .map(|(key, value)| (key, value.into()))
            .collect();
        request
    }

    /// Parse and apply limits in one step
    pub fn from_params<I, K, V>(params: I, config: &PaginationConfig) -> QueryRequest
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::parse(params).into_request(config)
    }
}

fn parse_number(key: &str, value: &str) -> Option<u64> {
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::debug!(key, value, "Ignoring malformed paging parameter");
            None
        }
    }
}

/// `name,desc;created_at` → `[name desc, created_at asc]`
fn parse_sort(value: &str) -> Vec<SortKey> {
    value
        .split(';')
        .filter_map(|part| {
            let mut pieces = part.split(',').map(str::trim);
            let column = pieces.next().filter(|c| !c.is_empty())?;
            let direction = match pieces.next() {
                None | Some("") => OrderDirection::Ascending,
                Some(dir) => match dir.parse() {
                    Ok(direction) => direction,
                    Err(()) => {
                        tracing::debug!(column, direction = dir, "Unknown sort direction, using asc");
                        OrderDirection::Ascending
                    }
                },
            };
            Some(SortKey::new(column, direction))
        })
        .collect()
}
