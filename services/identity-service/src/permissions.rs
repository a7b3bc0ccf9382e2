//! Permissions

use entity_rest::catalog::{CatalogEntry, DomainError};
use entity_rest::crud::{CreateHooks, DeleteHooks, FetchAllHooks, FetchByIdHooks, UpdateHooks};
use entity_rest::handlers::{ApiError, Validate, ValidationErrors};
use entity_rest::repository::{Column, Entity, EntitySchema, FilterValue, Record};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::DEFAULT_GUARD;

static PERMISSION_SCHEMA: EntitySchema = EntitySchema::new(
    "permissions",
    "id",
    &[
        Column::uuid("id"),
        Column::text("name"),
        Column::text("guard_name"),
    ],
);

/// A named ability, e.g. `users.write`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub guard_name: String,
}

impl Permission {
    pub fn new(name: impl Into<String>, guard_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            guard_name: guard_name.into(),
        }
    }
}

impl Record for Permission {
    fn value(&self, column: &str) -> Option<FilterValue> {
        match column {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "guard_name" => Some(self.guard_name.clone().into()),
            _ => None,
        }
    }
}

impl Entity for Permission {
    type Id = Uuid;

    fn schema() -> &'static EntitySchema {
        &PERMISSION_SCHEMA
    }

    fn id(&self) -> &Uuid {
        &self.id
    }
}

pub const PERMISSION_NOT_FOUND: CatalogEntry = CatalogEntry::new(
    "RES-PRM-0001",
    "Resource",
    "Permission",
    "error.permission.not.found",
    "Permission {0} was not found",
    StatusCode::NOT_FOUND,
);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("permission {0} not found")]
pub struct PermissionNotFound(pub Uuid);

impl From<PermissionNotFound> for ApiError {
    fn from(err: PermissionNotFound) -> Self {
        DomainError::new(PERMISSION_NOT_FOUND).with_arg(err.0).into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePermission {
    pub name: String,
    pub guard_name: Option<String>,
}

impl Validate for CreatePermission {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim();
        errors.check(name.is_empty(), "name", "validation.required");
        errors.check(name.contains(char::is_whitespace), "name", "validation.format");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePermission {
    pub name: Option<String>,
}

impl Validate for UpdatePermission {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = self.name.as_deref().map(str::trim) {
            errors.check(name.is_empty(), "name", "validation.required");
            errors.check(name.contains(char::is_whitespace), "name", "validation.format");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionHooks;

impl FetchAllHooks<Permission> for PermissionHooks {
    fn filterable_columns(&self) -> &[&'static str] {
        &["guard_name"]
    }

    fn cursor_value(&self, permission: &Permission) -> String {
        permission.id.to_string()
    }
}

impl FetchByIdHooks<Permission> for PermissionHooks {
    type NotFound = PermissionNotFound;

    fn on_not_found(&self, id: &Uuid) -> PermissionNotFound {
        PermissionNotFound(*id)
    }
}

impl CreateHooks<Permission> for PermissionHooks {
    type CreateRequest = CreatePermission;

    fn on_creating(&self, request: CreatePermission) -> Permission {
        let guard = request
            .guard_name
            .filter(|g| !g.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GUARD.to_string());
        Permission::new(request.name.trim(), guard)
    }
}

impl UpdateHooks<Permission> for PermissionHooks {
    type UpdateRequest = UpdatePermission;

    fn on_updating(&self, mut permission: Permission, request: UpdatePermission) -> Permission {
        if let Some(name) = request.name {
            permission.name = name.trim().to_string();
        }
        permission
    }
}

impl DeleteHooks<Permission> for PermissionHooks {}

/// Permissions every fresh deployment starts with
pub fn seed() -> Vec<Permission> {
    ["users.read", "users.write", "roles.read", "roles.write"]
        .into_iter()
        .map(|name| Permission::new(name, DEFAULT_GUARD))
        .chain([Permission::new("tokens.issue", "api")])
        .collect()
}
