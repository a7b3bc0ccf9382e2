//! # entity-rest
//!
//! Generic CRUD pipeline for REST resources. One implementation of search,
//! filtering, pagination and lifecycle hooks, shared by every resource type.
//!
//! ## Features
//!
//! - **Predicates**: free-text search and column filters, limited to
//!   per-resource allow-lists and validated against the entity schema
//! - **Pagination**: length-aware offset pages, switching to keyset cursor
//!   pages for deep pages or when a cursor is supplied
//! - **Hooks**: fixed-order `before_*`/`on_*`/`after_*` callbacks per CRUD phase
//! - **Repositories**: in-memory (`DashMap`) and PostgreSQL (`sqlx`, feature
//!   `database`) implementations of one async trait, with atomic
//!   read-modify-write and optional soft delete
//! - **HTTP boundary**: axum routes, a uniform response envelope and a
//!   catalogued error model
//! - **Operations**: figment configuration, JSON tracing, graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use entity_rest::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let app = with_fallbacks(Router::new());
//!
//!     Server::new(config).serve(app).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod crud;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod repository;
pub mod server;

#[cfg(feature = "database")]
pub mod database;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{CatalogEntry, DomainError, MessageNamespace, SystemCatalog};
    pub use crate::config::{Config, DatabaseConfig, PaginationConfig};
    pub use crate::crud::{
        CreateHooks, CrudError, CrudService, DeleteHooks, FetchAllHooks, FetchByIdHooks, PageInfo,
        PaginatedResult, QueryRequest, ResourceHooks, UpdateHooks,
    };
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{
        with_fallbacks, ApiError, ApiResponse, Identity, ListQuery, ResourceController,
        Transformer, Validate, ValidationErrors,
    };
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        Column, Condition, Entity, EntitySchema, FilterValue, InMemoryRepository, Record,
        Repository, RepositoryError, RepositoryResult, SoftDeletable, SoftDeleteRepository,
    };
    pub use crate::server::Server;

    #[cfg(feature = "database")]
    pub use crate::database::create_pool;

    #[cfg(feature = "database")]
    pub use crate::repository::sql::PgRepository;

    pub use axum::{
        extract::{Path, Query, State},
        routing::{delete, get, post, put},
        Json, Router,
    };
    pub use serde::{Deserialize, Serialize};
}
