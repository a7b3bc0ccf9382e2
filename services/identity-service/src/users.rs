//! User accounts
//!
//! Searchable by `name` and `email`, filterable by `status`. New accounts
//! start as `PENDING_VERIFICATION`; changing the email clears the
//! verification timestamp. Emails are unique among live accounts, and
//! deleting an account only sets `deleted_at`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use entity_rest::catalog::{CatalogEntry, DomainError};
use entity_rest::crud::{CreateHooks, DeleteHooks, FetchAllHooks, FetchByIdHooks, UpdateHooks};
use entity_rest::handlers::{ApiError, Transformer, Validate, ValidationErrors};
use entity_rest::repository::{Column, Entity, EntitySchema, FilterValue, Record, SoftDeletable};
use http::StatusCode;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+-]+@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}$")
        .expect("EMAIL_REGEX is a valid regex pattern")
});

const MAX_NAME_LENGTH: usize = 255;
const MIN_PASSWORD_LENGTH: usize = 8;

static USER_SCHEMA: EntitySchema = EntitySchema::new(
    "users",
    "id",
    &[
        Column::uuid("id"),
        Column::text("name"),
        Column::text("email"),
        Column::text("status"),
        Column::timestamp("email_verified_at"),
        Column::integer("login_count"),
        Column::timestamp("created_at"),
        Column::timestamp("updated_at"),
        Column::timestamp("deleted_at"),
    ],
)
.with_soft_delete("deleted_at");

/// Account lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
    PendingVerification,
    Suspended,
    Locked,
    Banned,
}

impl UserStatus {
    /// Stored and wire representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::PendingVerification => "PENDING_VERIFICATION",
            Self::Suspended => "SUSPENDED",
            Self::Locked => "LOCKED",
            Self::Banned => "BANNED",
        }
    }

    /// Whether the account may sign in
    pub const fn can_sign_in(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown user status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for UserStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Active,
            Self::Inactive,
            Self::PendingVerification,
            Self::Suspended,
            Self::Locked,
            Self::Banned,
        ]
        .into_iter()
        .find(|status| status.as_str() == s)
        .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub login_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// A fresh, unverified account
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            email: normalize_email(&email.into()),
            status: UserStatus::PendingVerification,
            email_verified_at: None,
            login_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

impl Record for User {
    fn value(&self, column: &str) -> Option<FilterValue> {
        match column {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "status" => Some(self.status.as_str().into()),
            "email_verified_at" => Some(self.email_verified_at.map_or(FilterValue::Null, Into::into)),
            "login_count" => Some(self.login_count.into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            "deleted_at" => Some(self.deleted_at.map_or(FilterValue::Null, Into::into)),
            _ => None,
        }
    }
}

impl Entity for User {
    type Id = Uuid;

    fn schema() -> &'static EntitySchema {
        &USER_SCHEMA
    }

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl SoftDeletable for User {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, deleted_at: Option<DateTime<Utc>>) {
        self.deleted_at = deleted_at;
    }
}

#[cfg(feature = "database")]
impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for User {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let status: String = row.try_get("status")?;
        let status = status.parse().map_err(|err: UnknownStatus| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(err),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            status,
            email_verified_at: row.try_get("email_verified_at")?,
            login_count: row.try_get("login_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

pub const USER_NOT_FOUND: CatalogEntry = CatalogEntry::new(
    "RES-USR-0001",
    "Resource",
    "User",
    "error.user.not.found",
    "User {0} was not found",
    StatusCode::NOT_FOUND,
);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("user {0} not found")]
pub struct UserNotFound(pub Uuid);

impl From<UserNotFound> for ApiError {
    fn from(err: UserNotFound) -> Self {
        DomainError::new(USER_NOT_FOUND).with_arg(err.0).into()
    }
}

/// Body of `POST /api/users`
#[derive(Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Validate for CreateUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        errors.check(name.is_empty(), "name", "validation.required");
        errors.check(name.chars().count() > MAX_NAME_LENGTH, "name", "validation.max");

        if self.email.trim().is_empty() {
            errors.add("email", "validation.required");
        } else {
            errors.check(!is_valid_email(&self.email), "email", "validation.email");
        }

        errors.check(
            self.password.chars().count() < MIN_PASSWORD_LENGTH,
            "password",
            "validation.min",
        );
        errors.check(
            self.password != self.password_confirmation,
            "password_confirmation",
            "validation.confirmed",
        );

        errors.into_result()
    }
}

/// Body of `PUT /api/users/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<UserStatus>,
}

impl Validate for UpdateUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(name.trim().is_empty(), "name", "validation.required");
            errors.check(name.trim().chars().count() > MAX_NAME_LENGTH, "name", "validation.max");
        }
        if let Some(email) = &self.email {
            errors.check(!is_valid_email(email), "email", "validation.email");
        }
        errors.into_result()
    }
}

/// Hook set for users
#[derive(Debug, Clone, Copy, Default)]
pub struct UserHooks;

impl FetchAllHooks<User> for UserHooks {
    fn searchable_columns(&self) -> &[&'static str] {
        &["name", "email"]
    }

    fn filterable_columns(&self) -> &[&'static str] {
        &["status"]
    }

    fn cursor_value(&self, user: &User) -> String {
        user.id.to_string()
    }
}

impl FetchByIdHooks<User> for UserHooks {
    type NotFound = UserNotFound;

    fn on_not_found(&self, id: &Uuid) -> UserNotFound {
        tracing::debug!(user_id = %id, "User lookup missed");
        UserNotFound(*id)
    }
}

impl CreateHooks<User> for UserHooks {
    type CreateRequest = CreateUser;

    fn unique_values(&self, request: &CreateUser) -> Vec<(&'static str, FilterValue)> {
        vec![("email", normalize_email(&request.email).into())]
    }

    fn on_creating(&self, request: CreateUser) -> User {
        User::new(request.name.trim(), request.email)
    }

    fn after_create(&self, user: &User) {
        tracing::info!(user_id = %user.id, status = %user.status, "User created");
    }
}

impl UpdateHooks<User> for UserHooks {
    type UpdateRequest = UpdateUser;

    fn unique_values(&self, request: &UpdateUser) -> Vec<(&'static str, FilterValue)> {
        request
            .email
            .iter()
            .map(|email| ("email", normalize_email(email).into()))
            .collect()
    }

    fn on_updating(&self, mut user: User, request: UpdateUser) -> User {
        if let Some(name) = request.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = request.email {
            let email = normalize_email(&email);
            if email != user.email {
                user.email = email;
                user.email_verified_at = None;
            }
        }
        if let Some(status) = request.status {
            if status != user.status {
                tracing::info!(user_id = %user.id, from = %user.status, to = %status, "User status changed");
            }
            user.status = status;
        }
        user.updated_at = Utc::now();
        user
    }
}

impl DeleteHooks<User> for UserHooks {
    fn after_delete(&self, id: &Uuid) {
        tracing::info!(user_id = %id, "User deleted");
    }

    fn after_restore(&self, user: &User) {
        tracing::info!(user_id = %user.id, "User restored");
    }
}

/// List row
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
}

/// Detail view
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub email_verified: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub can_sign_in: bool,
    pub login_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserTransformer;

impl Transformer<User> for UserTransformer {
    type Index = UserSummary;
    type Detail = UserView;

    fn to_index(&self, user: User) -> UserSummary {
        UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
            status: user.status,
        }
    }

    fn to_detail(&self, user: User) -> UserView {
        UserView {
            id: user.id,
            email_verified: user.email_verified_at.is_some(),
            can_sign_in: user.status.can_sign_in(),
            name: user.name,
            email: user.email,
            status: user.status,
            email_verified_at: user.email_verified_at,
            login_count: user.login_count,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
