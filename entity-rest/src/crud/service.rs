//! CRUD orchestration
//!
//! [`CrudService`] composes a repository, a hook set and the list machinery
//! into the operations the HTTP boundary exposes. Each operation is
//! `hooks → repository → hooks → return`; there is no retry anywhere.
//!
//! Create and update first check the hook's unique values against the store
//! and fail with [`CrudError::Duplicate`] naming the taken columns. Update
//! then reads, changes and writes the entity as one unit through
//! [`Repository::update_with`].

use std::convert::Infallible;
use std::fmt;

use crate::repository::{
    Condition, Entity, FilterCondition, FilterValue, Pagination, Repository, RepositoryError,
    SoftDeletable, SoftDeleteRepository,
};

use super::fetch_all::FetchAllOrchestrator;
use super::hooks::{CreateHooks, DeleteHooks, FetchAllHooks, FetchByIdHooks, UpdateHooks};
use super::page::PaginatedResult;
use super::request::QueryRequest;
use super::strategy::DEFAULT_CURSOR_THRESHOLD;

/// Failure of a CRUD operation
///
/// `Domain` carries exactly what the resource's `on_not_found` hook returned.
/// `Repository` carries the storage error untouched. Operations that cannot
/// miss an entity (create) use the default `D = Infallible`.
#[derive(Debug, thiserror::Error)]
pub enum CrudError<D = Infallible> {
    /// The resource-specific not-found error
    #[error("{0}")]
    Domain(D),

    /// Columns whose requested value another entity already holds
    #[error("value already taken for {}", .0.join(", "))]
    Duplicate(Vec<&'static str>),

    /// A storage failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl<D> CrudError<D> {
    /// The domain error, if this is one
    pub fn domain(&self) -> Option<&D> {
        match self {
            Self::Domain(d) => Some(d),
            Self::Duplicate(_) | Self::Repository(_) => None,
        }
    }

    /// Columns that failed the uniqueness check, if this is such a failure
    pub fn duplicates(&self) -> &[&'static str] {
        match self {
            Self::Duplicate(columns) => columns,
            Self::Domain(_) | Self::Repository(_) => &[],
        }
    }
}

/// Generic CRUD service for one resource type
///
/// # Example
///
/// ```rust,ignore
/// let service = CrudService::new(InMemoryRepository::new(), UserHooks::default())
///     .with_cursor_threshold(config.pagination.cursor_threshold);
///
/// let page = service.fetch_all(&QueryRequest::new(20).with_search("jo")).await?;
/// let user = service.find_by_id(&id).await?;
/// ```
pub struct CrudService<E, R, H> {
    repository: R,
    hooks: H,
    cursor_threshold: u64,
    _entity: std::marker::PhantomData<fn() -> E>,
}

impl<E, R, H> fmt::Debug for CrudService<E, R, H>
where
    E: Entity,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudService")
            .field("resource", &E::schema().table)
            .field("cursor_threshold", &self.cursor_threshold)
            .finish()
    }
}

impl<E, R, H> CrudService<E, R, H>
where
    E: Entity,
    R: Repository<E>,
{
    /// Service over `repository` with `hooks`, cursor threshold 100
    pub fn new(repository: R, hooks: H) -> Self {
        Self {
            repository,
            hooks,
            cursor_threshold: DEFAULT_CURSOR_THRESHOLD,
            _entity: std::marker::PhantomData,
        }
    }

    /// Page index from which list requests use cursor pagination
    #[must_use]
    pub fn with_cursor_threshold(mut self, cursor_threshold: u64) -> Self {
        self.cursor_threshold = cursor_threshold;
        self
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The hook set
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Cursor threshold in effect
    pub fn cursor_threshold(&self) -> u64 {
        self.cursor_threshold
    }

    /// One page of entities
    pub async fn fetch_all(
        &self,
        request: &QueryRequest,
    ) -> Result<PaginatedResult<E>, RepositoryError>
    where
        H: FetchAllHooks<E>,
    {
        FetchAllOrchestrator::new(&self.repository, &self.hooks, self.cursor_threshold)
            .fetch(request)
            .await
    }

    /// Number of entities matching the request's search and filters
    pub async fn count(&self, request: &QueryRequest) -> Result<u64, RepositoryError>
    where
        H: FetchAllHooks<E>,
    {
        FetchAllOrchestrator::new(&self.repository, &self.hooks, self.cursor_threshold)
            .count(request)
            .await
    }

    /// The entity with `id`, or the resource's not-found error
    pub async fn find_by_id(&self, id: &E::Id) -> Result<E, CrudError<H::NotFound>>
    where
        H: FetchByIdHooks<E>,
    {
        self.hooks.before_find_by_id(id);
        self.hooks.on_finding_by_id(id);

        match self.repository.find_by_id(id).await? {
            Some(entity) => {
                self.hooks.after_find_by_id(&entity);
                Ok(entity)
            }
            None => {
                tracing::debug!(resource = E::schema().table, %id, "Entity not found");
                Err(CrudError::Domain(self.hooks.on_not_found(id)))
            }
        }
    }

    /// Build an entity from `request` and persist it
    pub async fn create(&self, request: H::CreateRequest) -> Result<E, CrudError>
    where
        H: CreateHooks<E>,
    {
        self.hooks.before_create(&request);
        let taken = self
            .taken_columns(self.hooks.unique_values(&request), None)
            .await?;
        if !taken.is_empty() {
            return Err(CrudError::Duplicate(taken));
        }

        let entity = self.hooks.on_creating(request);
        let saved = self.repository.save(entity).await?;
        self.hooks.after_create(&saved);

        tracing::debug!(resource = E::schema().table, id = %saved.id(), "Entity created");
        Ok(saved)
    }

    /// Apply `request` to the entity with `id` and persist it
    pub async fn update(
        &self,
        id: &E::Id,
        request: H::UpdateRequest,
    ) -> Result<E, CrudError<H::NotFound>>
    where
        H: FetchByIdHooks<E> + UpdateHooks<E>,
    {
        self.hooks.before_find_by_id(id);
        self.hooks.on_finding_by_id(id);
        let taken = self
            .taken_columns(self.hooks.unique_values(&request), Some(id))
            .await?;
        if !taken.is_empty() {
            return Err(CrudError::Duplicate(taken));
        }

        let hooks = &self.hooks;
        let updated = self
            .repository
            .update_with(id, move |existing| {
                hooks.after_find_by_id(&existing);
                hooks.before_update(&request);
                hooks.on_updating(existing, request)
            })
            .await?;

        match updated {
            Some(saved) => {
                self.hooks.after_update(&saved);
                tracing::debug!(resource = E::schema().table, %id, "Entity updated");
                Ok(saved)
            }
            None => {
                tracing::debug!(resource = E::schema().table, %id, "Entity not found for update");
                Err(CrudError::Domain(self.hooks.on_not_found(id)))
            }
        }
    }

    /// Delete the entity with `id`, or return the resource's not-found error
    pub async fn delete(&self, id: &E::Id) -> Result<(), CrudError<H::NotFound>>
    where
        H: FetchByIdHooks<E> + DeleteHooks<E>,
    {
        self.hooks.before_delete(id);
        self.hooks.on_deleting_by_id(id);

        if !self.repository.delete(id).await? {
            tracing::debug!(resource = E::schema().table, %id, "Entity not found for delete");
            return Err(CrudError::Domain(self.hooks.on_not_found(id)));
        }

        self.hooks.after_delete(id);
        tracing::debug!(resource = E::schema().table, %id, "Entity deleted");
        Ok(())
    }

    /// Mark the entity with `id` deleted, keeping its row
    pub async fn soft_delete(&self, id: &E::Id) -> Result<(), CrudError<H::NotFound>>
    where
        E: SoftDeletable,
        R: SoftDeleteRepository<E>,
        H: FetchByIdHooks<E> + DeleteHooks<E>,
    {
        self.hooks.before_delete(id);
        self.hooks.on_deleting_by_id(id);

        if !self.repository.soft_delete(id).await? {
            tracing::debug!(resource = E::schema().table, %id, "Entity not found for soft delete");
            return Err(CrudError::Domain(self.hooks.on_not_found(id)));
        }

        self.hooks.after_delete(id);
        tracing::debug!(resource = E::schema().table, %id, "Entity soft-deleted");
        Ok(())
    }

    /// Bring back the soft-deleted entity with `id`
    pub async fn restore(&self, id: &E::Id) -> Result<E, CrudError<H::NotFound>>
    where
        E: SoftDeletable,
        R: SoftDeleteRepository<E>,
        H: FetchByIdHooks<E> + DeleteHooks<E>,
    {
        let restored = if self.repository.restore(id).await? {
            self.repository.find_by_id(id).await?
        } else {
            None
        };

        let Some(entity) = restored else {
            tracing::debug!(resource = E::schema().table, %id, "No deleted entity to restore");
            return Err(CrudError::Domain(self.hooks.on_not_found(id)));
        };

        self.hooks.after_restore(&entity);
        tracing::debug!(resource = E::schema().table, %id, "Entity restored");
        Ok(entity)
    }

    /// Columns in `values` already held by an entity other than `own`
    async fn taken_columns(
        &self,
        values: Vec<(&'static str, FilterValue)>,
        own: Option<&E::Id>,
    ) -> Result<Vec<&'static str>, RepositoryError> {
        let mut taken = Vec::new();
        for (column, value) in values {
            let condition = Condition::from(FilterCondition::eq(column, value));
            let holders = self
                .repository
                .find_all(&condition, &[], Pagination::first_page(2))
                .await?;
            if holders.iter().any(|holder| Some(holder.id()) != own) {
                taken.push(column);
            }
        }

        if !taken.is_empty() {
            tracing::debug!(resource = E::schema().table, columns = ?taken, "Unique value already taken");
        }
        Ok(taken)
    }
}
