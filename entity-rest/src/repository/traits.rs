//! Repository trait definitions
//!
//! The persistence collaborator the CRUD core talks to. Methods use RPITIT
//! (Return Position Impl Trait In Traits), so implementations write plain
//! `async fn` without `async_trait`.
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_rest::repository::{
//!     Condition, Pagination, Repository, RepositoryResult, SortKey,
//! };
//!
//! struct UserRepository {
//!     pool: PgPool,
//! }
//!
//! impl Repository<User> for UserRepository {
//!     async fn find_by_id(&self, id: &Uuid) -> RepositoryResult<Option<User>> {
//!         sqlx::query_as("SELECT * FROM users WHERE id = $1")
//!             .bind(id)
//!             .fetch_optional(&self.pool)
//!             .await
//!             .map_err(Into::into)
//!     }
//!     // ... other methods
//! }
//! ```

use std::future::Future;

use super::condition::Condition;
use super::error::RepositoryError;
use super::pagination::{Pagination, SortKey};
use super::schema::{Entity, SoftDeletable};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Storage operations for one entity type
///
/// Implementations own transactions and timeouts. Errors are returned as-is
/// and the CRUD core never retries them.
pub trait Repository<E: Entity>: Send + Sync {
    /// Find an entity by its unique identifier
    ///
    /// Returns `Ok(Some(entity))` if found, `Ok(None)` if not found.
    fn find_by_id(&self, id: &E::Id) -> impl Future<Output = RepositoryResult<Option<E>>> + Send;

    /// Find the window of entities matching `condition`
    ///
    /// Rows are ordered by `sort` in key order. The returned `Vec` keeps that
    /// order; callers never re-sort it.
    fn find_all(
        &self,
        condition: &Condition,
        sort: &[SortKey],
        pagination: Pagination,
    ) -> impl Future<Output = RepositoryResult<Vec<E>>> + Send;

    /// Count entities matching `condition`
    fn count(&self, condition: &Condition) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Insert `entity`, or replace the stored entity with the same identifier
    fn save(&self, entity: E) -> impl Future<Output = RepositoryResult<E>> + Send;

    /// Read the live entity with `id`, apply `change` and store the result
    ///
    /// The read and the write form one unit: no other write to the same entity
    /// lands in between. Returns `Ok(None)` without calling `change` when no
    /// live entity has `id`.
    fn update_with<F>(
        &self,
        id: &E::Id,
        change: F,
    ) -> impl Future<Output = RepositoryResult<Option<E>>> + Send
    where
        F: FnOnce(E) -> E + Send;

    /// Delete an entity by ID
    ///
    /// Returns `Ok(true)` if an entity was deleted, `Ok(false)` if none existed.
    /// Soft-deleted rows are removed too.
    fn delete(&self, id: &E::Id) -> impl Future<Output = RepositoryResult<bool>> + Send;
}

/// Soft delete support for entities whose schema declares a deletion column
///
/// Soft-deleted entities disappear from `find_by_id`, `find_all`, `count` and
/// `update_with`; [`Repository::delete`] still removes them for good.
///
/// # Example
///
/// ```rust,ignore
/// if repo.soft_delete(&user_id).await? {
///     // gone from listings, still on disk
///     assert!(repo.find_by_id(&user_id).await?.is_none());
///     repo.restore(&user_id).await?;
/// }
/// ```
pub trait SoftDeleteRepository<E: SoftDeletable>: Repository<E> {
    /// Mark the live entity with `id` as deleted
    ///
    /// Returns `Ok(false)` if there is no live entity with `id`.
    fn soft_delete(&self, id: &E::Id) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Clear the deletion mark of the entity with `id`
    ///
    /// Returns `Ok(false)` if the entity does not exist or is not deleted.
    fn restore(&self, id: &E::Id) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Like [`Repository::find_all`], soft-deleted entities included
    fn find_with_deleted(
        &self,
        condition: &Condition,
        sort: &[SortKey],
        pagination: Pagination,
    ) -> impl Future<Output = RepositoryResult<Vec<E>>> + Send;
}
