//! Generic CRUD core
//!
//! One pipeline shared by every resource type:
//!
//! - [`PredicateBuilder`] turns a search term and filter map into a
//!   [`Condition`](crate::repository::Condition) limited to allow-listed columns
//! - [`PaginationStrategy`] pages that condition by offset or by cursor
//! - [`FetchAllOrchestrator`] runs the list phase and picks the strategy
//! - the hook traits ([`FetchAllHooks`], [`FetchByIdHooks`], [`CreateHooks`],
//!   [`UpdateHooks`], [`DeleteHooks`]) carry each resource's business logic
//! - [`CrudService`] composes all of the above into fetch-all, count, find,
//!   create, update and delete
//!
//! List operations never fail on client input: unknown filter keys are
//! skipped and a malformed cursor yields an empty page. The only expected
//! error is a missing entity, reported through the resource's own
//! `on_not_found` hook.

mod fetch_all;
mod hooks;
mod page;
mod predicate;
mod request;
mod service;
mod strategy;

#[cfg(test)]
pub(crate) mod fixture;

pub use fetch_all::FetchAllOrchestrator;
pub use hooks::{CreateHooks, DeleteHooks, FetchAllHooks, FetchByIdHooks, ResourceHooks, UpdateHooks};
pub use page::{total_pages, PageInfo, PaginatedResult};
pub use predicate::PredicateBuilder;
pub use request::{QueryRequest, DEFAULT_PAGE_SIZE};
pub use service::{CrudError, CrudService};
pub use strategy::{cursor_page, offset_page, PaginationStrategy, DEFAULT_CURSOR_THRESHOLD};
