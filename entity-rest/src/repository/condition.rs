//! Boolean query conditions
//!
//! A [`Condition`] is the tree the predicate builder produces and every
//! repository consumes. It is backend neutral: [`InMemoryRepository`] evaluates
//! it with [`Condition::matches`], the SQL renderer turns it into a parameterised
//! `WHERE` clause.
//!
//! [`InMemoryRepository`]: super::InMemoryRepository
//!
//! # Example
//!
//! ```rust
//! use entity_rest::repository::{Condition, FilterCondition};
//!
//! let search = Condition::any(vec![
//!     FilterCondition::contains_ignore_case("name", "jo").into(),
//!     FilterCondition::contains_ignore_case("email", "jo").into(),
//! ]);
//! let condition = search.and(FilterCondition::eq("status", "ACTIVE").into());
//! assert_eq!(condition.len(), 2);
//! ```

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::schema::Record;

/// Comparison operators a condition can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Less than (<)
    LessThan,
    /// Case-insensitive substring match (`lower(col) LIKE lower('%v%')`)
    ContainsIgnoreCase,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::LessThan => write!(f, "<"),
            Self::ContainsIgnoreCase => write!(f, "ILIKE"),
        }
    }
}

/// A value that can be used in filter conditions
///
/// # Example
///
/// ```rust
/// use entity_rest::repository::FilterValue;
///
/// let string_val: FilterValue = "active".into();
/// let int_val: FilterValue = 42_i64.into();
/// let bool_val: FilterValue = true.into();
/// assert_eq!(string_val.as_text(), Some("active"));
/// assert_eq!(int_val.as_text(), None);
/// assert_eq!(bool_val, FilterValue::Boolean(true));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// String value
    String(String),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// UUID value
    Uuid(Uuid),
    /// UTC timestamp value
    Timestamp(DateTime<Utc>),
    /// Null value
    Null,
}

impl FilterValue {
    /// Borrow the text of a `String` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Order two values of the same kind
    ///
    /// Integers and floats compare with each other. Values of unrelated kinds
    /// have no ordering, so no comparison involving them succeeds.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Uuid(a), Self::Uuid(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Uuid> for FilterValue {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A single comparison against a named column
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// The column name to filter on
    pub field: String,
    /// The comparison operator
    pub operator: FilterOperator,
    /// The value to compare against
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create a new filter condition
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter (field = value)
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Equal, value.into())
    }

    /// Create a less-than filter (field < value)
    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThan, value.into())
    }

    /// Create a case-insensitive substring filter
    pub fn contains_ignore_case(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self::new(
            field,
            FilterOperator::ContainsIgnoreCase,
            FilterValue::String(term.into()),
        )
    }

    /// Evaluate against a record held in memory
    ///
    /// A missing column value behaves like SQL `NULL`: only `= NULL` matches it.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        let actual = record.value(&self.field).unwrap_or(FilterValue::Null);
        match self.operator {
            FilterOperator::Equal => actual.compare(&self.value) == Some(Ordering::Equal),
            FilterOperator::LessThan => {
                actual != FilterValue::Null
                    && actual.compare(&self.value) == Some(Ordering::Less)
            }
            FilterOperator::ContainsIgnoreCase => match (actual.as_text(), self.value.as_text()) {
                (Some(haystack), Some(needle)) => haystack
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                _ => false,
            },
        }
    }
}

/// Composable boolean condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Every child must hold; empty is always true
    All(Vec<Condition>),
    /// At least one child must hold; empty is always false
    Any(Vec<Condition>),
    /// A single column comparison
    Compare(FilterCondition),
}

impl Condition {
    /// The always-true condition
    #[must_use]
    pub const fn all() -> Self {
        Self::All(Vec::new())
    }

    /// Disjunction of `conditions`
    #[must_use]
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self::Any(conditions)
    }

    /// Conjunction of `self` and `other`, flattening nested `All`s
    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        let mut parts = match self {
            Self::All(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::All(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::All(parts)
    }

    /// True when this is the always-true condition
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Self::All(parts) if parts.is_empty())
    }

    /// Number of top-level clauses
    pub fn len(&self) -> usize {
        match self {
            Self::All(parts) | Self::Any(parts) => parts.len(),
            Self::Compare(_) => 1,
        }
    }

    /// True when there are no top-level clauses
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluate against a record held in memory
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::All(parts) => parts.iter().all(|c| c.matches(record)),
            Self::Any(parts) => parts.iter().any(|c| c.matches(record)),
            Self::Compare(filter) => filter.matches(record),
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::all()
    }
}

impl From<FilterCondition> for Condition {
    fn from(filter: FilterCondition) -> Self {
        Self::Compare(filter)
    }
}
