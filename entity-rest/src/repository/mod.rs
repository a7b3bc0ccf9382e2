//! Persistence collaborator abstractions
//!
//! Everything the CRUD core needs from storage, and nothing more:
//!
//! - **Schema**: [`EntitySchema`], [`Column`] and the [`Entity`] / [`Record`]
//!   traits that describe a resource's columns and identifier
//! - **Conditions**: [`Condition`] trees of [`FilterCondition`]s, evaluated in
//!   memory or rendered to SQL
//! - **Windowing**: [`Pagination`] and multi-key [`SortKey`] ordering
//! - **Storage**: the async [`Repository`] trait and its
//!   [`SoftDeleteRepository`] extension, implemented by [`InMemoryRepository`]
//!   and (feature `database`) [`sql::PgRepository`]
//!
//! # Example
//!
//! ```rust
//! use entity_rest::repository::{
//!     Column, Condition, Entity, EntitySchema, FilterCondition, FilterValue, InMemoryRepository,
//!     Pagination, Record, Repository,
//! };
//!
//! #[derive(Clone)]
//! struct Note {
//!     id: i64,
//!     body: String,
//! }
//!
//! static NOTES: EntitySchema =
//!     EntitySchema::new("notes", "id", &[Column::integer("id"), Column::text("body")]);
//!
//! impl Record for Note {
//!     fn value(&self, column: &str) -> Option<FilterValue> {
//!         match column {
//!             "id" => Some(self.id.into()),
//!             "body" => Some(self.body.clone().into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! impl Entity for Note {
//!     type Id = i64;
//!     fn schema() -> &'static EntitySchema {
//!         &NOTES
//!     }
//!     fn id(&self) -> &i64 {
//!         &self.id
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let repo = InMemoryRepository::with_entities([
//!     Note { id: 1, body: "Buy milk".into() },
//!     Note { id: 2, body: "Call Bob".into() },
//! ]);
//! let condition: Condition = FilterCondition::contains_ignore_case("body", "MILK").into();
//! let notes = repo.find_all(&condition, &[], Pagination::first_page(10)).await.unwrap();
//! assert_eq!(notes.len(), 1);
//! # });
//! ```

mod condition;
mod error;
mod memory;
mod pagination;
mod schema;
#[cfg(feature = "database")]
pub mod sql;
mod traits;

// Re-export all public types
pub use condition::{Condition, FilterCondition, FilterOperator, FilterValue};
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::InMemoryRepository;
pub use pagination::{OrderDirection, Pagination, SortKey};
pub use schema::{Column, ColumnType, Entity, EntitySchema, Record, SoftDeletable};
pub use traits::{Repository, RepositoryResult, SoftDeleteRepository};
