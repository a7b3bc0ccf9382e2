//! In-memory repository
//!
//! A [`Repository`] backed by a shared `DashMap`. Conditions are evaluated with
//! [`Condition::matches`], so it honours exactly the semantics the SQL renderer
//! produces. Cloning the repository shares the underlying map.
//!
//! `update_with` runs its change while holding the entry's shard lock, which
//! makes the read-modify-write atomic against other writers.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;

use super::condition::{Condition, FilterValue};
use super::pagination::{OrderDirection, Pagination, SortKey};
use super::schema::{Entity, Record, SoftDeletable};
use super::traits::{Repository, RepositoryResult, SoftDeleteRepository};

/// Concurrent in-memory store for one entity type
pub struct InMemoryRepository<E: Entity> {
    rows: Arc<DashMap<E::Id, E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            rows: Arc::new(DashMap::new()),
        }
    }

    /// Create a repository pre-populated with `entities`
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let repo = Self::new();
        for entity in entities {
            repo.rows.insert(entity.id().clone(), entity);
        }
        repo
    }

    /// Number of stored entities, soft-deleted ones included
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the repository holds no entities
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn matching(&self, condition: &Condition) -> Vec<E> {
        self.rows
            .iter()
            .filter(|entry| condition.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn window(mut rows: Vec<E>, sort: &[SortKey], pagination: Pagination) -> Vec<E> {
        sort_rows(&mut rows, sort);

        let offset = usize::try_from(pagination.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
        rows.into_iter().skip(offset).take(limit).collect()
    }
}

impl<E: Entity> std::fmt::Debug for InMemoryRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("table", &E::schema().table)
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

/// Order two column values, nulls last (as Postgres sorts ascending)
fn compare_values(a: Option<FilterValue>, b: Option<FilterValue>) -> Ordering {
    let a = a.unwrap_or(FilterValue::Null);
    let b = b.unwrap_or(FilterValue::Null);
    match (&a, &b) {
        (FilterValue::Null, FilterValue::Null) => Ordering::Equal,
        (FilterValue::Null, _) => Ordering::Greater,
        (_, FilterValue::Null) => Ordering::Less,
        _ => a.compare(&b).unwrap_or(Ordering::Equal),
    }
}

/// Sort by `keys`, then by identifier ascending so every window is stable
fn sort_rows<E: Entity>(rows: &mut [E], keys: &[SortKey]) {
    let identifier = E::schema().identifier;
    let tiebreak = (!keys.iter().any(|k| k.column == identifier)).then(|| SortKey::asc(identifier));

    rows.sort_by(|a, b| {
        keys.iter()
            .chain(tiebreak.as_ref())
            .map(|key| {
                let ordering = compare_values(a.value(&key.column), b.value(&key.column));
                match key.direction {
                    OrderDirection::Ascending => ordering,
                    OrderDirection::Descending => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn find_by_id(&self, id: &E::Id) -> RepositoryResult<Option<E>> {
        Ok(self
            .rows
            .get(id)
            .filter(|entry| E::schema().is_live(entry.value()))
            .map(|entry| entry.value().clone()))
    }

    async fn find_all(
        &self,
        condition: &Condition,
        sort: &[SortKey],
        pagination: Pagination,
    ) -> RepositoryResult<Vec<E>> {
        let rows = self.matching(&E::schema().live(condition));
        Ok(Self::window(rows, sort, pagination))
    }

    async fn count(&self, condition: &Condition) -> RepositoryResult<u64> {
        let condition = E::schema().live(condition);
        let matched = self
            .rows
            .iter()
            .filter(|entry| condition.matches(entry.value()))
            .count();
        Ok(matched as u64)
    }

    async fn save(&self, entity: E) -> RepositoryResult<E> {
        self.rows.insert(entity.id().clone(), entity.clone());
        Ok(entity)
    }

    async fn update_with<F>(&self, id: &E::Id, change: F) -> RepositoryResult<Option<E>>
    where
        F: FnOnce(E) -> E + Send,
    {
        let Some(mut row) = self.rows.get_mut(id) else {
            return Ok(None);
        };
        if !E::schema().is_live(row.value()) {
            return Ok(None);
        }

        let updated = change(row.value().clone());
        *row.value_mut() = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: &E::Id) -> RepositoryResult<bool> {
        Ok(self.rows.remove(id).is_some())
    }
}

impl<E: SoftDeletable> SoftDeleteRepository<E> for InMemoryRepository<E> {
    async fn soft_delete(&self, id: &E::Id) -> RepositoryResult<bool> {
        match self.rows.get_mut(id) {
            Some(mut row) if row.deleted_at().is_none() => {
                row.set_deleted_at(Some(Utc::now()));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restore(&self, id: &E::Id) -> RepositoryResult<bool> {
        match self.rows.get_mut(id) {
            Some(mut row) if row.deleted_at().is_some() => {
                row.set_deleted_at(None);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_with_deleted(
        &self,
        condition: &Condition,
        sort: &[SortKey],
        pagination: Pagination,
    ) -> RepositoryResult<Vec<E>> {
        Ok(Self::window(self.matching(condition), sort, pagination))
    }
}
