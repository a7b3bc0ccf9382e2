//! Lifecycle hooks
//!
//! Each resource type supplies one hook set, built once at startup and shared
//! across requests. Hook sets are values handed to [`CrudService::new`]; the
//! service never looks them up implicitly.
//!
//! Every CRUD phase calls its hooks in a fixed order:
//!
//! | Phase     | Order                                                                                   |
//! |-----------|-----------------------------------------------------------------------------------------|
//! | fetch all | `before_fetch_all` → build predicate → `on_fetching_all` → page → `after_fetch_all`     |
//! | find      | `before_find_by_id` → `on_finding_by_id` → lookup → `after_find_by_id` or `on_not_found`|
//! | create    | `before_create` → uniqueness → `on_creating` → save → `after_create`                    |
//! | update    | `before_find_by_id` → `on_finding_by_id` → uniqueness → locked read → `after_find_by_id` → `before_update` → `on_updating` → write → `after_update` |
//! | delete    | `before_delete` → `on_deleting_by_id` → delete → `after_delete` or `on_not_found`       |
//! | restore   | restore → `after_restore` or `on_not_found`                                             |
//!
//! Soft delete runs the delete hooks. In update, everything from the locked
//! read to the write happens inside [`Repository::update_with`]; a missing
//! entity ends the phase with `on_not_found`.
//!
//! `before_*` and `after_*` are side effects only (auditing, metrics). Only
//! `unique_values`, `on_creating`, `on_updating` and `on_not_found` return
//! values the service acts on.
//!
//! Hook sets must not keep per-request state in their fields; they are called
//! concurrently from many requests.
//!
//! [`CrudService::new`]: super::CrudService::new
//! [`Repository::update_with`]: crate::repository::Repository::update_with

use crate::repository::{Entity, FilterValue};

use super::page::PaginatedResult;
use super::request::QueryRequest;

/// Hooks for list and count operations
pub trait FetchAllHooks<E: Entity>: Send + Sync {
    /// Columns the search term is matched against
    ///
    /// Empty means every textual column of the schema.
    fn searchable_columns(&self) -> &[&'static str] {
        &[]
    }

    /// Columns clients may filter on
    ///
    /// Empty means any real column of the schema.
    fn filterable_columns(&self) -> &[&'static str] {
        &[]
    }

    /// Cursor string that resumes listing after `entity`
    ///
    /// Must parse back into `E::Id`.
    fn cursor_value(&self, entity: &E) -> String;

    /// Called before the predicate is built
    fn before_fetch_all(&self, _request: &QueryRequest) {}

    /// Called after the predicate is built, before any query runs
    fn on_fetching_all(&self) {}

    /// Called with the finished page
    fn after_fetch_all(&self, _result: &PaginatedResult<E>) {}
}

/// Hooks for single-entity lookup
pub trait FetchByIdHooks<E: Entity>: Send + Sync {
    /// Error returned when an entity does not exist
    type NotFound;

    /// Called before the lookup
    fn before_find_by_id(&self, _id: &E::Id) {}

    /// Called immediately before the lookup
    fn on_finding_by_id(&self, _id: &E::Id) {}

    /// Called with the entity that was found
    fn after_find_by_id(&self, _entity: &E) {}

    /// The error for a missing entity
    ///
    /// This is the only not-found error the service ever produces for this
    /// resource type.
    fn on_not_found(&self, id: &E::Id) -> Self::NotFound;
}

/// Hooks for creation
pub trait CreateHooks<E: Entity>: Send + Sync {
    /// Request body accepted by create
    type CreateRequest: Send;

    /// Called before the entity is built
    fn before_create(&self, _request: &Self::CreateRequest) {}

    /// Column values from `request` that no stored entity may already hold
    ///
    /// Values must be in stored form, normalised the way `on_creating` stores
    /// them.
    fn unique_values(&self, _request: &Self::CreateRequest) -> Vec<(&'static str, FilterValue)> {
        Vec::new()
    }

    /// Build the entity to persist from `request`
    fn on_creating(&self, request: Self::CreateRequest) -> E;

    /// Called with the persisted entity
    fn after_create(&self, _entity: &E) {}
}

/// Hooks for updates
pub trait UpdateHooks<E: Entity>: Send + Sync {
    /// Request body accepted by update
    type UpdateRequest: Send;

    /// Called once the target entity has been found
    fn before_update(&self, _request: &Self::UpdateRequest) {}

    /// Column values from `request` that no other stored entity may hold
    fn unique_values(&self, _request: &Self::UpdateRequest) -> Vec<(&'static str, FilterValue)> {
        Vec::new()
    }

    /// Apply `request` to `entity` and return the entity to persist
    fn on_updating(&self, entity: E, request: Self::UpdateRequest) -> E;

    /// Called with the persisted entity
    fn after_update(&self, _entity: &E) {}
}

/// Hooks for deletion
pub trait DeleteHooks<E: Entity>: Send + Sync {
    /// Called before the delete
    fn before_delete(&self, _id: &E::Id) {}

    /// Called immediately before the delete
    fn on_deleting_by_id(&self, _id: &E::Id) {}

    /// Called after a successful delete
    fn after_delete(&self, _id: &E::Id) {}

    /// Called with an entity brought back from soft deletion
    fn after_restore(&self, _entity: &E) {}
}

/// The full hook set of a resource type
pub trait ResourceHooks<E: Entity>:
    FetchAllHooks<E> + FetchByIdHooks<E> + CreateHooks<E> + UpdateHooks<E> + DeleteHooks<E>
{
}

impl<E, H> ResourceHooks<E> for H
where
    E: Entity,
    H: FetchAllHooks<E> + FetchByIdHooks<E> + CreateHooks<E> + UpdateHooks<E> + DeleteHooks<E>,
{
}
