//! Entity to response DTO mapping
//!
//! Each resource decides what a list row, a detail view and the
//! created/updated payloads look like. Only `to_index` and `to_detail` are
//! required; created and updated responses default to the detail shape.

use serde::Serialize;

/// Maps an entity to the DTOs its routes return
///
/// # Example
///
/// ```rust,ignore
/// struct UserTransformer;
///
/// impl Transformer<User> for UserTransformer {
///     type Index = UserSummary;
///     type Detail = UserView;
///
///     fn to_index(&self, user: User) -> UserSummary { UserSummary::from(user) }
///     fn to_detail(&self, user: User) -> UserView { UserView::from(user) }
/// }
/// ```
pub trait Transformer<E>: Send + Sync + 'static {
    /// Row of a list response
    type Index: Serialize + Send;
    /// Single-entity response
    type Detail: Serialize + Send;

    /// List row
    fn to_index(&self, entity: E) -> Self::Index;

    /// Detail view
    fn to_detail(&self, entity: E) -> Self::Detail;

    /// Body of a create response
    fn to_created(&self, entity: E) -> Self::Detail {
        self.to_detail(entity)
    }

    /// Body of an update response
    fn to_updated(&self, entity: E) -> Self::Detail {
        self.to_detail(entity)
    }
}

/// Serializes the entity itself for every view
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<E> Transformer<E> for Identity
where
    E: Serialize + Send + 'static,
{
    type Index = E;
    type Detail = E;

    fn to_index(&self, entity: E) -> E {
        entity
    }

    fn to_detail(&self, entity: E) -> E {
        entity
    }
}
