//! Entity schemas and column metadata
//!
//! Every entity type declares a static [`EntitySchema`]. The predicate builder
//! validates incoming column names against it and coerces raw filter values to
//! the declared column type, so nothing client-supplied ever reaches a query
//! as a column name.
//!
//! # Example
//!
//! ```rust
//! use entity_rest::repository::{Column, ColumnType, EntitySchema, FilterValue};
//!
//! static SCHEMA: EntitySchema = EntitySchema::new(
//!     "users",
//!     "id",
//!     &[
//!         Column::uuid("id"),
//!         Column::text("name"),
//!         Column::boolean("verified"),
//!     ],
//! );
//!
//! assert_eq!(SCHEMA.textual_columns().count(), 1);
//! let verified = SCHEMA.column("verified").unwrap();
//! assert_eq!(verified.column_type, ColumnType::Boolean);
//! assert_eq!(verified.coerce(&"true".into()), Some(FilterValue::Boolean(true)));
//! ```

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::condition::{Condition, FilterCondition, FilterValue};

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Free text; the only type searched by default
    Text,
    /// 64-bit integer
    Integer,
    /// 64-bit float
    Float,
    /// Boolean
    Boolean,
    /// UUID
    Uuid,
    /// UTC timestamp
    Timestamp,
}

impl ColumnType {
    /// Whether the column holds text
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Text)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::Uuid => write!(f, "uuid"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name as used in filters and storage
    pub name: &'static str,
    /// Declared type
    pub column_type: ColumnType,
}

impl Column {
    /// Create a column
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type }
    }

    /// Text column
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    /// Integer column
    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    /// Float column
    pub const fn float(name: &'static str) -> Self {
        Self::new(name, ColumnType::Float)
    }

    /// Boolean column
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    /// UUID column
    pub const fn uuid(name: &'static str) -> Self {
        Self::new(name, ColumnType::Uuid)
    }

    /// Timestamp column
    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, ColumnType::Timestamp)
    }

    /// Convert `value` to this column's type.
    ///
    /// Strings are parsed; values already of the right kind pass through and
    /// `Null` is accepted for every column. Returns `None` when the value
    /// cannot represent this column.
    pub fn coerce(&self, value: &FilterValue) -> Option<FilterValue> {
        if matches!(value, FilterValue::Null) {
            return Some(FilterValue::Null);
        }

        match (self.column_type, value) {
            (ColumnType::Text, FilterValue::String(_)) => Some(value.clone()),
            (ColumnType::Text, other) => Some(FilterValue::String(other.to_string())),

            (ColumnType::Integer, FilterValue::Integer(_)) => Some(value.clone()),
            (ColumnType::Integer, FilterValue::String(s)) => {
                s.trim().parse().ok().map(FilterValue::Integer)
            }

            (ColumnType::Float, FilterValue::Float(_)) => Some(value.clone()),
            (ColumnType::Float, FilterValue::Integer(n)) => Some(FilterValue::Float(*n as f64)),
            (ColumnType::Float, FilterValue::String(s)) => {
                s.trim().parse().ok().map(FilterValue::Float)
            }

            (ColumnType::Boolean, FilterValue::Boolean(_)) => Some(value.clone()),
            (ColumnType::Boolean, FilterValue::String(s)) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => Some(FilterValue::Boolean(true)),
                    "false" | "0" | "no" => Some(FilterValue::Boolean(false)),
                    _ => None,
                }
            }

            (ColumnType::Uuid, FilterValue::Uuid(_)) => Some(value.clone()),
            (ColumnType::Uuid, FilterValue::String(s)) => {
                Uuid::parse_str(s.trim()).ok().map(FilterValue::Uuid)
            }

            (ColumnType::Timestamp, FilterValue::Timestamp(_)) => Some(value.clone()),
            (ColumnType::Timestamp, FilterValue::String(s)) => {
                parse_timestamp(s.trim()).map(FilterValue::Timestamp)
            }

            _ => None,
        }
    }
}

/// RFC 3339, or a bare date taken as midnight UTC
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Static description of an entity's storage shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Table or collection name
    pub table: &'static str,
    /// Name of the identifier column cursor pagination orders by
    pub identifier: &'static str,
    /// All columns, identifier included
    pub columns: &'static [Column],
    /// Timestamp column marking soft-deleted rows, if the entity has one
    pub soft_delete: Option<&'static str>,
}

impl EntitySchema {
    /// Create a schema
    pub const fn new(
        table: &'static str,
        identifier: &'static str,
        columns: &'static [Column],
    ) -> Self {
        Self {
            table,
            identifier,
            columns,
            soft_delete: None,
        }
    }

    /// The same schema, with rows whose `column` is set treated as deleted
    ///
    /// `column` must be one of the declared columns.
    pub const fn with_soft_delete(self, column: &'static str) -> Self {
        Self {
            soft_delete: Some(column),
            ..self
        }
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether a column with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Columns of textual type, in declaration order
    pub fn textual_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|c| c.column_type.is_textual())
    }

    /// `condition` narrowed to rows that are not soft-deleted
    pub fn live(&self, condition: &Condition) -> Condition {
        match self.soft_delete {
            Some(column) => condition
                .clone()
                .and(FilterCondition::eq(column, FilterValue::Null).into()),
            None => condition.clone(),
        }
    }

    /// Whether `record` is visible to normal reads
    pub fn is_live<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.soft_delete.map_or(true, |column| {
            matches!(record.value(column), None | Some(FilterValue::Null))
        })
    }
}

/// Column-wise read access to a row
pub trait Record {
    /// Current value of `column`, or `None` if the column is unknown
    fn value(&self, column: &str) -> Option<FilterValue>;
}

/// A persistable resource
///
/// Identifiers must round-trip through strings (they travel as cursors and
/// path segments) and convert into a [`FilterValue`] for the cursor bound.
pub trait Entity: Record + Clone + Send + Sync + 'static {
    /// Identifier type
    type Id: Clone
        + Eq
        + Hash
        + fmt::Display
        + FromStr
        + Into<FilterValue>
        + Send
        + Sync
        + 'static;

    /// Storage schema shared by every instance
    fn schema() -> &'static EntitySchema;

    /// This entity's identifier
    fn id(&self) -> &Self::Id;
}

/// An entity that is marked deleted instead of being removed
///
/// The schema must name the same column via [`EntitySchema::with_soft_delete`].
pub trait SoftDeletable: Entity {
    /// When the entity was soft-deleted, if it was
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Set or clear the deletion mark
    fn set_deleted_at(&mut self, deleted_at: Option<DateTime<Utc>>);
}
