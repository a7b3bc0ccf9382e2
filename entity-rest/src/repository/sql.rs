//! PostgreSQL rendering of conditions and a pool-backed repository
//!
//! Column names are taken from the entity's static [`EntitySchema`], never
//! from the condition itself: a condition naming an unknown column is rejected
//! before any SQL is produced. Every value is a bound parameter.
//!
//! # Example
//!
//! ```rust
//! use entity_rest::repository::sql::select_query;
//! use entity_rest::repository::{Column, Condition, EntitySchema, FilterCondition, Pagination, SortKey};
//!
//! static SCHEMA: EntitySchema = EntitySchema::new(
//!     "users",
//!     "id",
//!     &[Column::uuid("id"), Column::text("status")],
//! );
//!
//! let condition: Condition = FilterCondition::eq("status", "ACTIVE").into();
//! let query = select_query(&SCHEMA, &condition, &[SortKey::desc("id")], Pagination::first_page(20)).unwrap();
//! assert_eq!(
//!     query.sql(),
//!     r#"SELECT * FROM "users" WHERE "status" = $1 ORDER BY "id" DESC LIMIT $2 OFFSET $3"#
//! );
//! ```

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::condition::{Condition, FilterCondition, FilterOperator, FilterValue};
use super::error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
use super::pagination::{OrderDirection, Pagination, SortKey};
use super::schema::{Entity, EntitySchema, SoftDeletable};
use super::traits::{Repository, RepositoryResult, SoftDeleteRepository};

fn quoted(name: &str) -> String {
    format!("\"{name}\"")
}

fn unknown_column(operation: RepositoryOperation, schema: &EntitySchema, name: &str) -> RepositoryError {
    RepositoryError::new(
        operation,
        RepositoryErrorKind::Other,
        format!("unknown column '{name}'"),
    )
    .with_entity(schema.table, name)
}

/// Escape LIKE wildcards so the term is matched literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Bind `value`, or write a literal `NULL`
pub fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::String(s) => {
            builder.push_bind(s.clone());
        }
        FilterValue::Integer(n) => {
            builder.push_bind(*n);
        }
        FilterValue::Float(n) => {
            builder.push_bind(*n);
        }
        FilterValue::Boolean(b) => {
            builder.push_bind(*b);
        }
        FilterValue::Uuid(u) => {
            builder.push_bind(*u);
        }
        FilterValue::Timestamp(t) => {
            builder.push_bind(*t);
        }
        FilterValue::Null => {
            builder.push("NULL");
        }
    }
}

fn push_comparison(
    builder: &mut QueryBuilder<'static, Postgres>,
    schema: &EntitySchema,
    filter: &FilterCondition,
    operation: RepositoryOperation,
) -> RepositoryResult<()> {
    let column = schema
        .column(&filter.field)
        .ok_or_else(|| unknown_column(operation, schema, &filter.field))?;
    let name = quoted(column.name);

    match (filter.operator, &filter.value) {
        (FilterOperator::Equal, FilterValue::Null) => {
            builder.push(name).push(" IS NULL");
        }
        (FilterOperator::LessThan, FilterValue::Null) => {
            builder.push("FALSE");
        }
        (FilterOperator::Equal | FilterOperator::LessThan, value) => {
            builder.push(name).push(format!(" {} ", filter.operator));
            push_value(builder, value);
        }
        (FilterOperator::ContainsIgnoreCase, value) => {
            let term = value.as_text().map_or_else(|| value.to_string(), str::to_owned);
            builder
                .push(format!("LOWER({name}) LIKE LOWER("))
                .push_bind(like_pattern(&term))
                .push(")");
        }
    }
    Ok(())
}

fn push_group(
    builder: &mut QueryBuilder<'static, Postgres>,
    schema: &EntitySchema,
    parts: &[Condition],
    joiner: &str,
    empty: &str,
    operation: RepositoryOperation,
) -> RepositoryResult<()> {
    match parts {
        [] => {
            builder.push(empty);
        }
        [single] => push_condition(builder, schema, single, operation)?,
        _ => {
            builder.push("(");
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    builder.push(joiner);
                }
                push_condition(builder, schema, part, operation)?;
            }
            builder.push(")");
        }
    }
    Ok(())
}

/// Render `condition` as a boolean SQL expression
pub fn push_condition(
    builder: &mut QueryBuilder<'static, Postgres>,
    schema: &EntitySchema,
    condition: &Condition,
    operation: RepositoryOperation,
) -> RepositoryResult<()> {
    match condition {
        Condition::All(parts) => push_group(builder, schema, parts, " AND ", "TRUE", operation),
        Condition::Any(parts) => push_group(builder, schema, parts, " OR ", "FALSE", operation),
        Condition::Compare(filter) => push_comparison(builder, schema, filter, operation),
    }
}

fn push_where(
    builder: &mut QueryBuilder<'static, Postgres>,
    schema: &EntitySchema,
    condition: &Condition,
    operation: RepositoryOperation,
) -> RepositoryResult<()> {
    if !condition.is_unconstrained() {
        builder.push(" WHERE ");
        push_condition(builder, schema, condition, operation)?;
    }
    Ok(())
}

/// `SELECT *` with filter, ordering and window
///
/// Sort keys naming unknown columns are dropped. The identifier is appended
/// ascending unless a key already names it, so offset windows are stable.
pub fn select_query(
    schema: &EntitySchema,
    condition: &Condition,
    sort: &[SortKey],
    pagination: Pagination,
) -> RepositoryResult<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new(format!("SELECT * FROM {}", quoted(schema.table)));
    push_where(&mut builder, schema, condition, RepositoryOperation::FindAll)?;

    let mut order: Vec<String> = sort
        .iter()
        .filter_map(|key| {
            let column = schema.column(&key.column)?;
            let direction = match key.direction {
                OrderDirection::Ascending => "ASC",
                OrderDirection::Descending => "DESC",
            };
            Some(format!("{} {direction}", quoted(column.name)))
        })
        .collect();
    if !sort.iter().any(|key| key.column == schema.identifier) {
        order.push(format!("{} ASC", quoted(schema.identifier)));
    }
    builder.push(" ORDER BY ").push(order.join(", "));

    builder
        .push(" LIMIT ")
        .push_bind(i64::try_from(pagination.limit).unwrap_or(i64::MAX))
        .push(" OFFSET ")
        .push_bind(i64::try_from(pagination.offset).unwrap_or(i64::MAX));
    Ok(builder)
}

/// `SELECT COUNT(*)` with filter
pub fn count_query(
    schema: &EntitySchema,
    condition: &Condition,
) -> RepositoryResult<QueryBuilder<'static, Postgres>> {
    let mut builder =
        QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", quoted(schema.table)));
    push_where(&mut builder, schema, condition, RepositoryOperation::Count)?;
    Ok(builder)
}

/// `INSERT ... ON CONFLICT (identifier) DO UPDATE ... RETURNING *` for `entity`
pub fn upsert_query<E: Entity>(entity: &E) -> QueryBuilder<'static, Postgres> {
    let schema = E::schema();
    let names: Vec<String> = schema.columns.iter().map(|c| quoted(c.name)).collect();

    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        quoted(schema.table),
        names.join(", ")
    ));
    for (i, column) in schema.columns.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, &entity.value(column.name).unwrap_or(FilterValue::Null));
    }

    let updates: Vec<String> = schema
        .columns
        .iter()
        .filter(|c| c.name != schema.identifier)
        .map(|c| format!("{0} = EXCLUDED.{0}", quoted(c.name)))
        .collect();
    builder.push(format!(") ON CONFLICT ({}) ", quoted(schema.identifier)));
    if updates.is_empty() {
        builder.push("DO NOTHING");
    } else {
        builder.push("DO UPDATE SET ").push(updates.join(", "));
    }
    builder.push(" RETURNING *");
    builder
}

fn by_id_query<E: Entity>(prefix: &str, id: &E::Id) -> QueryBuilder<'static, Postgres> {
    let schema = E::schema();
    let mut builder = QueryBuilder::new(format!(
        "{prefix} FROM {} WHERE {} = ",
        quoted(schema.table),
        quoted(schema.identifier)
    ));
    push_value(&mut builder, &id.clone().into());
    builder
}

/// `SELECT *` of the live row with `id`
fn live_by_id_query<E: Entity>(id: &E::Id) -> QueryBuilder<'static, Postgres> {
    let mut builder = by_id_query::<E>("SELECT *", id);
    if let Some(column) = E::schema().soft_delete {
        builder.push(format!(" AND {} IS NULL", quoted(column)));
    }
    builder
}

fn soft_delete_column(
    schema: &EntitySchema,
    operation: RepositoryOperation,
) -> RepositoryResult<&'static str> {
    schema.soft_delete.ok_or_else(|| {
        RepositoryError::new(
            operation,
            RepositoryErrorKind::Other,
            format!("table '{}' has no soft delete column", schema.table),
        )
    })
}

fn mark_query<E: Entity>(
    id: &E::Id,
    deleted_at: Option<DateTime<Utc>>,
    operation: RepositoryOperation,
) -> RepositoryResult<QueryBuilder<'static, Postgres>> {
    let schema = E::schema();
    let column = quoted(soft_delete_column(schema, operation)?);

    let mut builder = QueryBuilder::new(format!("UPDATE {} SET {column} = ", quoted(schema.table)));
    let guard = match deleted_at {
        Some(at) => {
            builder.push_bind(at);
            "IS NULL"
        }
        None => {
            builder.push("NULL");
            "IS NOT NULL"
        }
    };
    builder.push(format!(" WHERE {} = ", quoted(schema.identifier)));
    push_value(&mut builder, &id.clone().into());
    builder.push(format!(" AND {column} {guard}"));
    Ok(builder)
}

/// `UPDATE` setting the deletion column of the live row with `id`
pub fn soft_delete_query<E: Entity>(
    id: &E::Id,
    deleted_at: DateTime<Utc>,
) -> RepositoryResult<QueryBuilder<'static, Postgres>> {
    mark_query::<E>(id, Some(deleted_at), RepositoryOperation::SoftDelete)
}

/// `UPDATE` clearing the deletion column of the soft-deleted row with `id`
pub fn restore_query<E: Entity>(id: &E::Id) -> RepositoryResult<QueryBuilder<'static, Postgres>> {
    mark_query::<E>(id, None, RepositoryOperation::Restore)
}

/// [`Repository`] over a PostgreSQL pool
///
/// Table and column names come from `E::schema()`; rows are decoded with the
/// entity's `FromRow` implementation. `update_with` locks the row with
/// `SELECT ... FOR UPDATE` and writes it back in the same transaction.
pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgRepository<E> {
    /// Create a repository over `pool`
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

fn during(operation: RepositoryOperation) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |err| RepositoryError {
        operation,
        ..RepositoryError::from(err)
    }
}

impl<E> Repository<E> for PgRepository<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow> + Unpin,
{
    async fn find_by_id(&self, id: &E::Id) -> RepositoryResult<Option<E>> {
        live_by_id_query::<E>(id)
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(during(RepositoryOperation::FindById))
    }

    async fn find_all(
        &self,
        condition: &Condition,
        sort: &[SortKey],
        pagination: Pagination,
    ) -> RepositoryResult<Vec<E>> {
        let schema = E::schema();
        let mut builder = select_query(schema, &schema.live(condition), sort, pagination)?;
        builder
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(during(RepositoryOperation::FindAll))
    }

    async fn count(&self, condition: &Condition) -> RepositoryResult<u64> {
        let schema = E::schema();
        let mut builder = count_query(schema, &schema.live(condition))?;
        let total: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(during(RepositoryOperation::Count))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn save(&self, entity: E) -> RepositoryResult<E> {
        let mut builder = upsert_query(&entity);
        let saved = builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(during(RepositoryOperation::Save))?;
        Ok(saved.unwrap_or(entity))
    }

    async fn update_with<F>(&self, id: &E::Id, change: F) -> RepositoryResult<Option<E>>
    where
        F: FnOnce(E) -> E + Send,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(during(RepositoryOperation::Save))?;

        let mut locking = live_by_id_query::<E>(id);
        locking.push(" FOR UPDATE");
        let current = locking
            .build_query_as::<E>()
            .fetch_optional(&mut *tx)
            .await
            .map_err(during(RepositoryOperation::FindById))?;

        // Dropping the transaction rolls it back
        let Some(current) = current else {
            return Ok(None);
        };

        let updated = change(current);
        let saved = upsert_query(&updated)
            .build_query_as::<E>()
            .fetch_optional(&mut *tx)
            .await
            .map_err(during(RepositoryOperation::Save))?;
        tx.commit().await.map_err(during(RepositoryOperation::Save))?;

        Ok(Some(saved.unwrap_or(updated)))
    }

    async fn delete(&self, id: &E::Id) -> RepositoryResult<bool> {
        let result = by_id_query::<E>("DELETE", id)
            .build()
            .execute(&self.pool)
            .await
            .map_err(during(RepositoryOperation::Delete))?;
        Ok(result.rows_affected() > 0)
    }
}

impl<E> SoftDeleteRepository<E> for PgRepository<E>
where
    E: SoftDeletable + for<'r> FromRow<'r, PgRow> + Unpin,
{
    async fn soft_delete(&self, id: &E::Id) -> RepositoryResult<bool> {
        let result = soft_delete_query::<E>(id, Utc::now())?
            .build()
            .execute(&self.pool)
            .await
            .map_err(during(RepositoryOperation::SoftDelete))?;
        Ok(result.rows_affected() > 0)
    }

    async fn restore(&self, id: &E::Id) -> RepositoryResult<bool> {
        let result = restore_query::<E>(id)?
            .build()
            .execute(&self.pool)
            .await
            .map_err(during(RepositoryOperation::Restore))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_with_deleted(
        &self,
        condition: &Condition,
        sort: &[SortKey],
        pagination: Pagination,
    ) -> RepositoryResult<Vec<E>> {
        let mut builder = select_query(E::schema(), condition, sort, pagination)?;
        builder
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(during(RepositoryOperation::FindAll))
    }
}
