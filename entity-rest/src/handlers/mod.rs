//! HTTP boundary for resource types
//!
//! Turns a [`CrudService`](crate::crud::CrudService) into REST routes with a
//! uniform response envelope.
//!
//! # Features
//!
//! - **Routes**: [`ResourceController`] mounts list, count, get, create,
//!   update and delete for one resource type
//! - **Queries**: [`ListQuery`] splits the query string into search, cursor,
//!   paging, sort and filters
//! - **Envelope**: [`ApiResponse`], [`Created`] and [`NoContent`]
//! - **Errors**: [`ApiError`] maps domain, storage and validation failures
//!   onto catalog codes and HTTP statuses
//! - **DTOs**: [`Transformer`] shapes list rows and detail views
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_rest::handlers::{with_fallbacks, ResourceController};
//!
//! let users = ResourceController::new(
//!     "/api/users",
//!     MessageNamespace::new("user"),
//!     CrudService::new(repository, UserHooks),
//!     UserTransformer,
//! )
//! .with_config(&config);
//!
//! let app = with_fallbacks(Router::new().merge(users.router()));
//! Server::new(config).serve(app).await?;
//! ```

mod controller;
mod error;
mod query;
mod response;
mod transformer;
mod validation;

pub use controller::{method_not_supported, route_not_found, with_fallbacks, ResourceController};
pub use error::{ApiError, ApiOperation};
pub use query::{ListQuery, RESERVED_KEYS};
pub use response::{ApiResponse, Created, ErrorBody, NoContent, ResponseMeta};
pub use transformer::{Identity, Transformer};
pub use validation::{Validate, ValidationErrors};
