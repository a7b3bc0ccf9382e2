//! List orchestration
//!
//! Runs the fetch-all phase: hooks, predicate, strategy selection, paging.

use std::marker::PhantomData;

use crate::repository::{Condition, Entity, Repository, RepositoryResult};

use super::hooks::FetchAllHooks;
use super::page::PaginatedResult;
use super::predicate::PredicateBuilder;
use super::request::QueryRequest;
use super::strategy::PaginationStrategy;

/// Entry point for list and count operations of one resource type
pub struct FetchAllOrchestrator<'a, E, R, H: ?Sized> {
    repository: &'a R,
    hooks: &'a H,
    cursor_threshold: u64,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E, R, H> FetchAllOrchestrator<'a, E, R, H>
where
    E: Entity,
    R: Repository<E>,
    H: FetchAllHooks<E> + ?Sized,
{
    /// Orchestrator switching to cursor mode from page index `cursor_threshold`
    pub fn new(repository: &'a R, hooks: &'a H, cursor_threshold: u64) -> Self {
        Self {
            repository,
            hooks,
            cursor_threshold,
            _entity: PhantomData,
        }
    }

    fn condition(&self, request: &QueryRequest) -> Condition {
        PredicateBuilder::new(E::schema())
            .searchable(self.hooks.searchable_columns())
            .filterable(self.hooks.filterable_columns())
            .build(request.search_term(), &request.filters)
    }

    /// One page of matching entities
    ///
    /// Repository errors propagate unchanged; bad filters and cursors never
    /// produce errors.
    pub async fn fetch(&self, request: &QueryRequest) -> RepositoryResult<PaginatedResult<E>> {
        self.hooks.before_fetch_all(request);

        let condition = self.condition(request);
        self.hooks.on_fetching_all();

        let strategy = PaginationStrategy::choose(request, self.cursor_threshold);
        tracing::debug!(
            resource = E::schema().table,
            %strategy,
            page = request.page,
            page_size = request.page_size,
            clauses = condition.len(),
            "Fetching page"
        );

        let result = strategy
            .execute(self.repository, self.hooks, condition, request)
            .await?;

        self.hooks.after_fetch_all(&result);
        Ok(result)
    }

    /// Number of entities matching the request's search and filters
    pub async fn count(&self, request: &QueryRequest) -> RepositoryResult<u64> {
        let condition = self.condition(request);
        self.repository.count(&condition).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::fixture::{member, Member, MemberHooks};
    use crate::crud::PageInfo;
    use crate::repository::InMemoryRepository;

    fn repo() -> InMemoryRepository<Member> {
        InMemoryRepository::with_entities([
            member(1, "John", "ACTIVE"),
            member(2, "Joanna", "LOCKED"),
            member(3, "Mary", "ACTIVE"),
            member(4, "Bob", "ACTIVE"),
            member(5, "Jon", "ACTIVE"),
        ])
    }

    #[tokio::test]
    async fn test_hook_order() {
        let repo = repo();
        let hooks = MemberHooks::default();
        FetchAllOrchestrator::new(&repo, &hooks, 100)
            .fetch(&QueryRequest::new(2))
            .await
            .unwrap();
        assert_eq!(
            hooks.calls(),
            vec!["before_fetch_all", "on_fetching_all", "after_fetch_all"]
        );
    }

    #[tokio::test]
    async fn test_offset_below_threshold() {
        let repo = repo();
        let hooks = MemberHooks::default();
        let result = FetchAllOrchestrator::new(&repo, &hooks, 100)
            .fetch(&QueryRequest::new(2).with_page(1))
            .await
            .unwrap();
        assert_eq!(result.pagination, PageInfo::length_aware(1, 2, 5));
        assert_eq!(result.data.len(), 2);
    }

    #[tokio::test]
    async fn test_deep_page_switches_to_cursor_from_top() {
        let repo = repo();
        let hooks = MemberHooks::default();
        let result = FetchAllOrchestrator::new(&repo, &hooks, 3)
            .fetch(&QueryRequest::new(2).with_page(3))
            .await
            .unwrap();
        assert!(matches!(result.pagination, PageInfo::Cursor { has_more: true, .. }));
        assert_eq!(result.data[0].name, "Jon");
    }

    #[tokio::test]
    async fn test_search_and_filter_restricted() {
        let repo = repo();
        let hooks = MemberHooks::restricted();
        let request = QueryRequest::new(10)
            .with_search("JO")
            .with_filter("status", "ACTIVE")
            .with_filter("email", "nobody@example.com");
        let result = FetchAllOrchestrator::new(&repo, &hooks, 100)
            .fetch(&request)
            .await
            .unwrap();
        let names: Vec<_> = result.data.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["John", "Jon"]);
    }

    #[tokio::test]
    async fn test_permissive_search_covers_every_textual_column() {
        let repo = repo();
        let hooks = MemberHooks::default();
        let request = QueryRequest::new(10).with_search("MARY@EXAMPLE");
        let orchestrator = FetchAllOrchestrator::new(&repo, &hooks, 100);
        let result = orchestrator.fetch(&request).await.unwrap();
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].name, "Mary");
    }

    #[tokio::test]
    async fn test_count_honours_search_and_filters() {
        let repo = repo();
        let hooks = MemberHooks::restricted();
        let orchestrator = FetchAllOrchestrator::new(&repo, &hooks, 100);
        assert_eq!(orchestrator.count(&QueryRequest::new(10)).await.unwrap(), 5);
        let request = QueryRequest::new(10).with_search("jo");
        assert_eq!(orchestrator.count(&request).await.unwrap(), 3);
        let request = request.with_filter("status", "LOCKED");
        assert_eq!(orchestrator.count(&request).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_after_hook_skipped_on_repository_error() {
        let repo = crate::crud::fixture::FailingRepository;
        let hooks = MemberHooks::default();
        let result = FetchAllOrchestrator::new(&repo, &hooks, 100)
            .fetch(&QueryRequest::new(2))
            .await;
        assert!(result.is_err());
        assert_eq!(hooks.calls(), vec!["before_fetch_all", "on_fetching_all"]);
    }
}
