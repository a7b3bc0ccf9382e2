//! Roles
//!
//! Roles keep the default allow-lists: search covers every text column and
//! any schema column may be filtered.

use entity_rest::catalog::{CatalogEntry, DomainError};
use entity_rest::crud::{CreateHooks, DeleteHooks, FetchAllHooks, FetchByIdHooks, UpdateHooks};
use entity_rest::handlers::{ApiError, Validate, ValidationErrors};
use entity_rest::repository::{Column, Entity, EntitySchema, FilterValue, Record};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Guard applied when a request does not name one
pub const DEFAULT_GUARD: &str = "web";

static ROLE_SCHEMA: EntitySchema = EntitySchema::new(
    "roles",
    "id",
    &[
        Column::uuid("id"),
        Column::text("name"),
        Column::text("guard_name"),
        Column::text("description"),
    ],
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub guard_name: String,
    pub description: Option<String>,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        guard_name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            guard_name: guard_name.into(),
            description,
        }
    }
}

impl Record for Role {
    fn value(&self, column: &str) -> Option<FilterValue> {
        match column {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "guard_name" => Some(self.guard_name.clone().into()),
            "description" => Some(
                self.description
                    .clone()
                    .map_or(FilterValue::Null, FilterValue::from),
            ),
            _ => None,
        }
    }
}

impl Entity for Role {
    type Id = Uuid;

    fn schema() -> &'static EntitySchema {
        &ROLE_SCHEMA
    }

    fn id(&self) -> &Uuid {
        &self.id
    }
}

pub const ROLE_NOT_FOUND: CatalogEntry = CatalogEntry::new(
    "RES-ROL-0001",
    "Resource",
    "Role",
    "error.role.not.found",
    "Role {0} was not found",
    StatusCode::NOT_FOUND,
);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("role {0} not found")]
pub struct RoleNotFound(pub Uuid);

impl From<RoleNotFound> for ApiError {
    fn from(err: RoleNotFound) -> Self {
        DomainError::new(ROLE_NOT_FOUND).with_arg(err.0).into()
    }
}

fn default_guard() -> String {
    DEFAULT_GUARD.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub name: String,
    #[serde(default = "default_guard")]
    pub guard_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for CreateRole {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.name.trim().is_empty(), "name", "validation.required");
        errors.check(
            self.guard_name.trim().is_empty(),
            "guard_name",
            "validation.required",
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Validate for UpdateRole {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let blank = self.name.as_deref().is_some_and(|n| n.trim().is_empty());
        errors.check(blank, "name", "validation.required");
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleHooks;

impl FetchAllHooks<Role> for RoleHooks {
    fn cursor_value(&self, role: &Role) -> String {
        role.id.to_string()
    }
}

impl FetchByIdHooks<Role> for RoleHooks {
    type NotFound = RoleNotFound;

    fn on_not_found(&self, id: &Uuid) -> RoleNotFound {
        RoleNotFound(*id)
    }
}

impl CreateHooks<Role> for RoleHooks {
    type CreateRequest = CreateRole;

    fn on_creating(&self, request: CreateRole) -> Role {
        Role::new(
            request.name.trim(),
            request.guard_name.trim(),
            request.description,
        )
    }

    fn after_create(&self, role: &Role) {
        tracing::info!(role_id = %role.id, name = %role.name, "Role created");
    }
}

impl UpdateHooks<Role> for RoleHooks {
    type UpdateRequest = UpdateRole;

    fn on_updating(&self, mut role: Role, request: UpdateRole) -> Role {
        if let Some(name) = request.name {
            role.name = name.trim().to_string();
        }
        if request.description.is_some() {
            role.description = request.description;
        }
        role
    }
}

impl DeleteHooks<Role> for RoleHooks {
    fn after_delete(&self, id: &Uuid) {
        tracing::info!(role_id = %id, "Role deleted");
    }
}

/// Roles every fresh deployment starts with
pub fn seed() -> Vec<Role> {
    vec![
        Role::new("admin", DEFAULT_GUARD, Some("Full access".into())),
        Role::new("editor", DEFAULT_GUARD, Some("Manage users".into())),
        Role::new("viewer", DEFAULT_GUARD, None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_defaults_to_web() {
        let request: CreateRole = serde_json::from_str(r#"{"name": "auditor"}"#).unwrap();
        assert_eq!(request.guard_name, "web");
        assert!(request.description.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_blank_guard_rejected() {
        let request: CreateRole =
            serde_json::from_str(r#"{"name": "auditor", "guard_name": " "}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.messages("guard_name"), ["validation.required"]);
    }

    #[test]
    fn test_permissive_allow_lists() {
        assert!(RoleHooks.searchable_columns().is_empty());
        assert!(RoleHooks.filterable_columns().is_empty());
    }

    #[test]
    fn test_update_keeps_absent_fields() {
        let role = Role::new("editor", "web", Some("Manage users".into()));
        let updated = RoleHooks.on_updating(
            role.clone(),
            UpdateRole {
                name: Some(" editors ".into()),
                description: None,
            },
        );
        assert_eq!(updated.name, "editors");
        assert_eq!(updated.description, role.description);
    }

    #[test]
    fn test_seed() {
        let roles = seed();
        assert_eq!(roles.len(), 3);
        assert!(roles.iter().all(|r| r.guard_name == DEFAULT_GUARD));
        assert_ne!(roles[0].id, roles[1].id);
    }
}
