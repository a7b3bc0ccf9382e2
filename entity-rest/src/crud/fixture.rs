//! Test resource shared by the crud and handlers tests

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{CatalogEntry, DomainError};
use crate::handlers::{ApiError, Validate, ValidationErrors};
use crate::repository::{
    Column, Condition, Entity, EntitySchema, FilterValue, Pagination, Record, Repository,
    RepositoryError, RepositoryOperation, RepositoryResult, SoftDeletable, SortKey,
};

use super::hooks::{CreateHooks, DeleteHooks, FetchAllHooks, FetchByIdHooks, UpdateHooks};
use super::page::PaginatedResult;
use super::request::QueryRequest;

static MEMBER_SCHEMA: EntitySchema = EntitySchema::new(
    "members",
    "id",
    &[
        Column::uuid("id"),
        Column::text("name"),
        Column::text("email"),
        Column::text("status"),
        Column::timestamp("deleted_at"),
    ],
)
.with_soft_delete("deleted_at");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record for Member {
    fn value(&self, column: &str) -> Option<FilterValue> {
        match column {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "status" => Some(self.status.clone().into()),
            "deleted_at" => Some(self.deleted_at.map_or(FilterValue::Null, Into::into)),
            _ => None,
        }
    }
}

impl Entity for Member {
    type Id = Uuid;

    fn schema() -> &'static EntitySchema {
        &MEMBER_SCHEMA
    }

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl SoftDeletable for Member {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, deleted_at: Option<DateTime<Utc>>) {
        self.deleted_at = deleted_at;
    }
}

/// Member `n`; identifiers ascend with `n`
pub(crate) fn member(n: u128, name: &str, status: &str) -> Member {
    Member {
        id: Uuid::from_u128(n),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        status: status.to_string(),
        deleted_at: None,
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("member {0} not found")]
pub(crate) struct MemberNotFound(pub Uuid);

pub(crate) const MEMBER_NOT_FOUND: CatalogEntry = CatalogEntry::new(
    "RES-MBR-0001",
    "Resource",
    "Member",
    "error.member.not.found",
    "Member {0} was not found",
    StatusCode::NOT_FOUND,
);

impl From<MemberNotFound> for ApiError {
    fn from(err: MemberNotFound) -> Self {
        DomainError::new(MEMBER_NOT_FOUND).with_arg(err.0).into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NewMember {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

impl Validate for NewMember {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.name.trim().is_empty(), "name", "validation.required");
        errors.check(!self.email.contains('@'), "email", "validation.email");
        errors.into_result()
    }
}

impl Validate for MemberPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let blank_name = self.name.as_deref().is_some_and(|n| n.trim().is_empty());
        errors.check(blank_name, "name", "validation.required");
        errors.into_result()
    }
}

/// Hook set that records every call
#[derive(Debug, Default)]
pub(crate) struct MemberHooks {
    restricted: bool,
    calls: Mutex<Vec<String>>,
}

impl MemberHooks {
    /// Searchable `[name]`, filterable `[status]`
    pub fn restricted() -> Self {
        Self {
            restricted: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, hook: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(hook.to_string());
        }
    }
}

impl FetchAllHooks<Member> for MemberHooks {
    fn searchable_columns(&self) -> &[&'static str] {
        if self.restricted {
            &["name"]
        } else {
            &[]
        }
    }

    fn filterable_columns(&self) -> &[&'static str] {
        if self.restricted {
            &["status"]
        } else {
            &[]
        }
    }

    fn cursor_value(&self, entity: &Member) -> String {
        entity.id.to_string()
    }

    fn before_fetch_all(&self, _request: &QueryRequest) {
        self.record("before_fetch_all");
    }

    fn on_fetching_all(&self) {
        self.record("on_fetching_all");
    }

    fn after_fetch_all(&self, _result: &PaginatedResult<Member>) {
        self.record("after_fetch_all");
    }
}

impl FetchByIdHooks<Member> for MemberHooks {
    type NotFound = MemberNotFound;

    fn before_find_by_id(&self, _id: &Uuid) {
        self.record("before_find_by_id");
    }

    fn on_finding_by_id(&self, _id: &Uuid) {
        self.record("on_finding_by_id");
    }

    fn after_find_by_id(&self, _entity: &Member) {
        self.record("after_find_by_id");
    }

    fn on_not_found(&self, id: &Uuid) -> MemberNotFound {
        self.record("on_not_found");
        MemberNotFound(*id)
    }
}

impl CreateHooks<Member> for MemberHooks {
    type CreateRequest = NewMember;

    fn before_create(&self, _request: &NewMember) {
        self.record("before_create");
    }

    fn unique_values(&self, request: &NewMember) -> Vec<(&'static str, FilterValue)> {
        vec![("email", request.email.clone().into())]
    }

    fn on_creating(&self, request: NewMember) -> Member {
        self.record("on_creating");
        Member {
            id: Uuid::now_v7(),
            name: request.name,
            email: request.email,
            status: "PENDING".to_string(),
            deleted_at: None,
        }
    }

    fn after_create(&self, _entity: &Member) {
        self.record("after_create");
    }
}

impl UpdateHooks<Member> for MemberHooks {
    type UpdateRequest = MemberPatch;

    fn before_update(&self, _request: &MemberPatch) {
        self.record("before_update");
    }

    fn unique_values(&self, request: &MemberPatch) -> Vec<(&'static str, FilterValue)> {
        request
            .email
            .iter()
            .map(|email| ("email", email.clone().into()))
            .collect()
    }

    fn on_updating(&self, mut entity: Member, request: MemberPatch) -> Member {
        self.record("on_updating");
        if let Some(name) = request.name {
            entity.name = name;
        }
        if let Some(email) = request.email {
            entity.email = email;
        }
        if let Some(status) = request.status {
            entity.status = status;
        }
        entity
    }

    fn after_update(&self, _entity: &Member) {
        self.record("after_update");
    }
}

impl DeleteHooks<Member> for MemberHooks {
    fn before_delete(&self, _id: &Uuid) {
        self.record("before_delete");
    }

    fn on_deleting_by_id(&self, _id: &Uuid) {
        self.record("on_deleting_by_id");
    }

    fn after_delete(&self, _id: &Uuid) {
        self.record("after_delete");
    }

    fn after_restore(&self, _entity: &Member) {
        self.record("after_restore");
    }
}

/// Repository whose every call fails with a connection error
pub(crate) struct FailingRepository;

fn offline(operation: RepositoryOperation) -> RepositoryError {
    RepositoryError::connection_failed(operation, "database offline")
}

impl Repository<Member> for FailingRepository {
    async fn find_by_id(&self, _id: &Uuid) -> RepositoryResult<Option<Member>> {
        Err(offline(RepositoryOperation::FindById))
    }

    async fn find_all(
        &self,
        _condition: &Condition,
        _sort: &[SortKey],
        _pagination: Pagination,
    ) -> RepositoryResult<Vec<Member>> {
        Err(offline(RepositoryOperation::FindAll))
    }

    async fn count(&self, _condition: &Condition) -> RepositoryResult<u64> {
        Err(offline(RepositoryOperation::Count))
    }

    async fn save(&self, _entity: Member) -> RepositoryResult<Member> {
        Err(offline(RepositoryOperation::Save))
    }

    async fn update_with<F>(&self, _id: &Uuid, _change: F) -> RepositoryResult<Option<Member>>
    where
        F: FnOnce(Member) -> Member + Send,
    {
        Err(offline(RepositoryOperation::Save))
    }

    async fn delete(&self, _id: &Uuid) -> RepositoryResult<bool> {
        Err(offline(RepositoryOperation::Delete))
    }
}
