//! Search and filter predicate construction
//!
//! Turns a free-text term and a filter map into a [`Condition`], restricted to
//! the schema's real columns and the resource's allow-lists.
//!
//! - The search term becomes an OR of case-insensitive "contains" comparisons
//!   over the searchable columns, or over every textual column when the
//!   allow-list is empty.
//! - Each filter becomes an equality comparison. Keys outside a non-empty
//!   filter allow-list are skipped; keys that are not columns, or whose value
//!   cannot be read as the column's type, are logged and skipped.
//! - The result is `search AND filter1 AND filter2 ...`.
//!
//! Building never fails.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use entity_rest::crud::PredicateBuilder;
//! use entity_rest::repository::{Column, Condition, EntitySchema, FilterCondition, FilterValue};
//!
//! static SCHEMA: EntitySchema = EntitySchema::new(
//!     "users",
//!     "id",
//!     &[Column::uuid("id"), Column::text("name"), Column::text("status")],
//! );
//!
//! let mut filters = BTreeMap::new();
//! filters.insert("status".to_string(), FilterValue::from("ACTIVE"));
//! filters.insert("password".to_string(), FilterValue::from("x"));
//!
//! let condition = PredicateBuilder::new(&SCHEMA)
//!     .searchable(&["name"])
//!     .filterable(&["status"])
//!     .build(Some("jo"), &filters);
//!
//! assert_eq!(
//!     condition,
//!     Condition::All(vec![
//!         Condition::Any(vec![FilterCondition::contains_ignore_case("name", "jo").into()]),
//!         FilterCondition::eq("status", "ACTIVE").into(),
//!     ])
//! );
//! ```

use std::collections::BTreeMap;

use crate::repository::{Column, Condition, EntitySchema, FilterCondition, FilterValue};

/// Builds conditions for one entity schema
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder<'a> {
    schema: &'a EntitySchema,
    searchable: &'a [&'a str],
    filterable: &'a [&'a str],
}

impl<'a> PredicateBuilder<'a> {
    /// Builder with empty (permissive) allow-lists
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self {
            schema,
            searchable: &[],
            filterable: &[],
        }
    }

    /// Restrict search to these columns
    #[must_use]
    pub fn searchable(mut self, columns: &'a [&'a str]) -> Self {
        self.searchable = columns;
        self
    }

    /// Restrict filters to these columns
    #[must_use]
    pub fn filterable(mut self, columns: &'a [&'a str]) -> Self {
        self.filterable = columns;
        self
    }

    /// Build `search AND filters`
    pub fn build(&self, search: Option<&str>, filters: &BTreeMap<String, FilterValue>) -> Condition {
        let mut condition = Condition::all();

        if let Some(clause) = search.and_then(|term| self.search_clause(term)) {
            condition = condition.and(clause);
        }

        for (key, value) in filters {
            if let Some(filter) = self.filter_clause(key, value) {
                condition = condition.and(filter.into());
            }
        }

        condition
    }

    fn search_columns(&self) -> Vec<&'a Column> {
        if self.searchable.is_empty() {
            tracing::debug!(
                resource = self.schema.table,
                "No searchable columns declared, searching all textual columns"
            );
            return self.schema.textual_columns().collect();
        }

        self.searchable
            .iter()
            .filter_map(|name| match self.schema.column(name) {
                Some(column) if column.column_type.is_textual() => Some(column),
                Some(column) => {
                    tracing::warn!(
                        resource = self.schema.table,
                        column = column.name,
                        column_type = %column.column_type,
                        "Searchable column is not textual, skipping"
                    );
                    None
                }
                None => {
                    tracing::warn!(
                        resource = self.schema.table,
                        column = *name,
                        "Searchable column does not exist, skipping"
                    );
                    None
                }
            })
            .collect()
    }

    /// A blank term is omitted; any other term is matched verbatim, padding included
    fn search_clause(&self, term: &str) -> Option<Condition> {
        if term.trim().is_empty() {
            return None;
        }

        let columns = self.search_columns();
        if columns.is_empty() {
            return None;
        }

        Some(Condition::any(
            columns
                .into_iter()
                .map(|column| FilterCondition::contains_ignore_case(column.name, term).into())
                .collect(),
        ))
    }

    fn filter_clause(&self, key: &str, value: &FilterValue) -> Option<FilterCondition> {
        if self.filterable.is_empty() {
            tracing::debug!(
                resource = self.schema.table,
                key,
                "No filterable columns declared, accepting filter key"
            );
        } else if !self.filterable.iter().any(|allowed| *allowed == key) {
            tracing::debug!(
                resource = self.schema.table,
                key,
                "Filter key not in allow-list, skipping"
            );
            return None;
        }

        let Some(column) = self.schema.column(key) else {
            tracing::warn!(
                resource = self.schema.table,
                key,
                "Invalid filter key, skipping"
            );
            return None;
        };

        let Some(coerced) = column.coerce(value) else {
            tracing::warn!(
                resource = self.schema.table,
                key,
                column_type = %column.column_type,
                value = %value,
                "Filter value does not match column type, skipping"
            );
            return None;
        };

        Some(FilterCondition::eq(column.name, coerced))
    }
}
