//! Offset and cursor pagination
//!
//! Both strategies run the same [`Condition`] against a [`Repository`].
//!
//! - **Offset** counts the matches, skips `page * page_size` rows and reports
//!   absolute page numbers. Cost grows with the offset.
//! - **Cursor** bounds the identifier (`identifier < cursor`), fetches
//!   `page_size + 1` rows newest first and uses the extra row only to decide
//!   `has_more`. Cost is independent of depth; no totals are computed.
//!
//! A cursor that does not parse as an identifier yields an empty final page,
//! never an error.

use std::fmt;

use crate::repository::{
    Condition, Entity, FilterCondition, Pagination, Repository, RepositoryResult, SortKey,
};

use super::hooks::FetchAllHooks;
use super::page::{PageInfo, PaginatedResult};
use super::request::QueryRequest;

/// Page number (zero-based) from which offset requests switch to cursor mode
pub const DEFAULT_CURSOR_THRESHOLD: u64 = 100;

/// Which pagination algorithm serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// Length-aware offset pagination
    Offset,
    /// Keyset pagination on the identifier
    Cursor,
}

impl fmt::Display for PaginationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset => write!(f, "offset"),
            Self::Cursor => write!(f, "cursor"),
        }
    }
}

impl PaginationStrategy {
    /// Cursor when a cursor is present or the page index reaches `cursor_threshold`
    ///
    /// # Example
    ///
    /// ```rust
    /// use entity_rest::crud::{PaginationStrategy, QueryRequest};
    ///
    /// let shallow = QueryRequest::new(20).with_page(3);
    /// let deep = QueryRequest::new(20).with_page(150);
    /// let resumed = QueryRequest::new(20).with_cursor("42");
    ///
    /// assert_eq!(PaginationStrategy::choose(&shallow, 100), PaginationStrategy::Offset);
    /// assert_eq!(PaginationStrategy::choose(&deep, 100), PaginationStrategy::Cursor);
    /// assert_eq!(PaginationStrategy::choose(&resumed, 100), PaginationStrategy::Cursor);
    /// ```
    pub fn choose(request: &QueryRequest, cursor_threshold: u64) -> Self {
        if request.cursor.is_some() || request.page >= cursor_threshold {
            Self::Cursor
        } else {
            Self::Offset
        }
    }

    /// Run this strategy
    pub async fn execute<E, R, H>(
        self,
        repository: &R,
        hooks: &H,
        condition: Condition,
        request: &QueryRequest,
    ) -> RepositoryResult<PaginatedResult<E>>
    where
        E: Entity,
        R: Repository<E>,
        H: FetchAllHooks<E> + ?Sized,
    {
        match self {
            Self::Offset => offset_page(repository, condition, request).await,
            Self::Cursor => cursor_page(repository, hooks, condition, request).await,
        }
    }
}

/// One length-aware page
pub async fn offset_page<E, R>(
    repository: &R,
    condition: Condition,
    request: &QueryRequest,
) -> RepositoryResult<PaginatedResult<E>>
where
    E: Entity,
    R: Repository<E>,
{
    let total_items = repository.count(&condition).await?;
    let window = Pagination::new(request.offset(), request.page_size);
    let data = repository
        .find_all(&condition, &request.sort, window)
        .await?;

    Ok(PaginatedResult::new(
        data,
        PageInfo::length_aware(request.page, request.page_size, total_items),
    ))
}

/// One cursor page, newest identifier first
pub async fn cursor_page<E, R, H>(
    repository: &R,
    hooks: &H,
    condition: Condition,
    request: &QueryRequest,
) -> RepositoryResult<PaginatedResult<E>>
where
    E: Entity,
    R: Repository<E>,
    H: FetchAllHooks<E> + ?Sized,
{
    let schema = E::schema();
    let page_size = request.page_size;

    let condition = match request.cursor.as_deref() {
        None => condition,
        Some(raw) => match raw.trim().parse::<E::Id>() {
            Ok(bound) => condition.and(FilterCondition::lt(schema.identifier, bound).into()),
            Err(_) => {
                tracing::warn!(
                    resource = schema.table,
                    cursor = raw,
                    "Malformed cursor, returning empty page"
                );
                return Ok(PaginatedResult::empty_cursor(page_size));
            }
        },
    };

    if !request.sort.is_empty() {
        tracing::debug!(
            resource = schema.table,
            "Cursor pages are ordered by identifier, ignoring requested sort"
        );
    }

    let order = [SortKey::desc(schema.identifier)];
    let mut data = repository
        .find_all(
            &condition,
            &order,
            Pagination::first_page(page_size.saturating_add(1)),
        )
        .await?;

    let limit = usize::try_from(page_size).unwrap_or(usize::MAX);
    let has_more = data.len() > limit;
    data.truncate(limit);

    let next_cursor = if has_more {
        data.last().map(|last| hooks.cursor_value(last))
    } else {
        None
    };

    Ok(PaginatedResult::new(
        data,
        PageInfo::cursor(page_size, has_more, next_cursor),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::fixture::{member, MemberHooks};
    use crate::repository::{InMemoryRepository, RepositoryError, RepositoryErrorKind};

    fn five_members() -> InMemoryRepository<crate::crud::fixture::Member> {
        InMemoryRepository::with_entities((1..=5).map(|n| member(n, &format!("u{n}"), "ACTIVE")))
    }

    fn ids(result: &PaginatedResult<crate::crud::fixture::Member>) -> Vec<String> {
        result.data.iter().map(|m| m.name.clone()).collect()
    }

    #[test]
    fn test_choose_at_threshold() {
        let request = QueryRequest::new(10).with_page(99);
        assert_eq!(PaginationStrategy::choose(&request, 100), PaginationStrategy::Offset);
        let request = request.with_page(100);
        assert_eq!(PaginationStrategy::choose(&request, 100), PaginationStrategy::Cursor);
    }

    #[tokio::test]
    async fn test_cursor_walk_visits_each_row_once() {
        let repo = five_members();
        let hooks = MemberHooks::default();

        let first = cursor_page(&repo, &hooks, Condition::all(), &QueryRequest::new(2))
            .await
            .unwrap();
        assert_eq!(ids(&first), vec!["u5", "u4"]);
        let PageInfo::Cursor { has_more, next_cursor, .. } = first.pagination.clone() else {
            panic!("expected cursor page");
        };
        assert!(has_more);
        assert_eq!(next_cursor, Some(hooks.cursor_value(&first.data[1])));

        let second_request = QueryRequest::new(2).with_cursor(next_cursor.unwrap());
        let second = cursor_page(&repo, &hooks, Condition::all(), &second_request)
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["u3", "u2"]);

        let PageInfo::Cursor { next_cursor, .. } = second.pagination else {
            panic!("expected cursor page");
        };
        let third_request = QueryRequest::new(2).with_cursor(next_cursor.unwrap());
        let third = cursor_page(&repo, &hooks, Condition::all(), &third_request)
            .await
            .unwrap();
        assert_eq!(ids(&third), vec!["u1"]);
        assert_eq!(third.pagination, PageInfo::cursor(2, false, None));
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_extra_page() {
        let repo = InMemoryRepository::with_entities((1..=4).map(|n| member(n, "x", "ACTIVE")));
        let page = cursor_page(&repo, &MemberHooks::default(), Condition::all(), &QueryRequest::new(4))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 4);
        assert_eq!(page.pagination, PageInfo::cursor(4, false, None));
    }

    #[tokio::test]
    async fn test_malformed_cursor_is_empty_page() {
        let repo = five_members();
        let request = QueryRequest::new(2).with_cursor("not-a-uuid");
        let page = cursor_page(&repo, &MemberHooks::default(), Condition::all(), &request)
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination, PageInfo::cursor(2, false, None));
    }

    #[tokio::test]
    async fn test_cursor_ignores_caller_sort() {
        let repo = five_members();
        let request = QueryRequest::new(5).with_sort(SortKey::asc("name"));
        let page = cursor_page(&repo, &MemberHooks::default(), Condition::all(), &request)
            .await
            .unwrap();
        assert_eq!(ids(&page), vec!["u5", "u4", "u3", "u2", "u1"]);
    }

    #[tokio::test]
    async fn test_offset_pages_sum_to_total() {
        let repo = InMemoryRepository::with_entities((1..=7).map(|n| member(n, "x", "ACTIVE")));
        let mut seen = 0;
        for page in 0..3 {
            let request = QueryRequest::new(3).with_page(page);
            let result = offset_page(&repo, Condition::all(), &request).await.unwrap();
            assert!(result.data.len() <= 3);
            assert_eq!(result.pagination, PageInfo::length_aware(page, 3, 7));
            seen += result.data.len();
        }
        assert_eq!(seen, 7);
    }

    #[tokio::test]
    async fn test_offset_past_end_is_empty_with_totals() {
        let repo = five_members();
        let request = QueryRequest::new(2).with_page(10);
        let result = offset_page(&repo, Condition::all(), &request).await.unwrap();
        assert!(result.data.is_empty());
        assert_eq!(
            result.pagination,
            PageInfo::LengthAware {
                page: 11,
                per_page: 2,
                total_pages: 3,
                total_items: 5
            }
        );
    }

    #[tokio::test]
    async fn test_repository_errors_pass_through() {
        let repo = crate::crud::fixture::FailingRepository;
        let err: RepositoryError = offset_page(&repo, Condition::all(), &QueryRequest::new(2))
            .await
            .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ConnectionFailed);
    }
}
