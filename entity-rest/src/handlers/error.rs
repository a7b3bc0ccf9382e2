//! API error types for handler operations
//!
//! [`ApiError`] is the single error type resource routes return. Everything
//! that can go wrong below the boundary converts into it:
//!
//! - a resource's [`DomainError`] keeps its own catalog entry and message
//! - a [`RepositoryError`] maps onto the data catalog entries, with internal
//!   and connectivity details masked
//! - [`ValidationErrors`] become `VAL-4001` with field-grouped messages
//! - a [`CrudError::Duplicate`] becomes `VAL-4001` with `validation.unique`
//!   on each taken column
//!
//! # Example
//!
//! ```rust
//! use entity_rest::catalog::SystemCatalog;
//! use entity_rest::handlers::{ApiError, ApiOperation};
//! use entity_rest::repository::{RepositoryError, RepositoryOperation};
//! use http::StatusCode;
//!
//! let err = ApiError::from(RepositoryError::connection_failed(
//!     RepositoryOperation::FindAll,
//!     "connection refused (10.0.0.3:5432)",
//! ))
//! .with_operation(ApiOperation::List);
//!
//! assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
//! assert_eq!(err.entry, SystemCatalog::DATABASE_CONNECTION_ERROR);
//! assert_eq!(err.message, "Service temporarily unavailable");
//! assert!(err.is_retriable());
//! ```

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::catalog::{CatalogEntry, DomainError, SystemCatalog};
use crate::crud::CrudError;
use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};

use super::response::{ApiResponse, ErrorBody, ResponseMeta};
use super::validation::ValidationErrors;

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing entities
    List,
    /// Counting entities
    Count,
    /// Getting a single entity by ID
    Get,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Deleting an entity
    Delete,
    /// Restoring a soft-deleted entity
    Restore,
    /// Routing, before any resource operation ran
    Route,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Count => write!(f, "count"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Restore => write!(f, "restore"),
            Self::Route => write!(f, "route"),
        }
    }
}

impl From<RepositoryOperation> for ApiOperation {
    fn from(op: RepositoryOperation) -> Self {
        match op {
            RepositoryOperation::FindById => Self::Get,
            RepositoryOperation::FindAll => Self::List,
            RepositoryOperation::Count => Self::Count,
            RepositoryOperation::Save => Self::Update,
            RepositoryOperation::Delete | RepositoryOperation::SoftDelete => Self::Delete,
            RepositoryOperation::Restore => Self::Restore,
        }
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// Catalog entry; decides code and HTTP status
    pub entry: CatalogEntry,
    /// Client-facing message
    pub message: String,
    /// Validation messages grouped by field
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// The type of entity involved
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
    /// Underlying cause; logged, never sent to the client
    pub detail: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, entry: CatalogEntry, message: impl Into<String>) -> Self {
        Self {
            operation,
            entry,
            message: message.into(),
            field_errors: BTreeMap::new(),
            entity_type: None,
            entity_id: None,
            detail: None,
        }
    }

    /// Unreadable body, path or query
    pub fn malformed(operation: ApiOperation, reason: impl fmt::Display) -> Self {
        let err = DomainError::new(SystemCatalog::MALFORMED_REQUEST).with_arg(reason);
        Self::new(operation, err.entry, err.message())
    }

    /// No route for `path`
    pub fn route_not_found(path: impl fmt::Display) -> Self {
        let err = DomainError::new(SystemCatalog::ROUTE_NOT_FOUND).with_arg(path);
        Self::new(ApiOperation::Route, err.entry, err.message())
    }

    /// Route exists, method does not
    pub fn method_not_supported() -> Self {
        let entry = SystemCatalog::METHOD_NOT_SUPPORTED;
        Self::new(ApiOperation::Route, entry, entry.message)
    }

    /// Masked internal failure
    pub fn internal(operation: ApiOperation, detail: impl Into<String>) -> Self {
        let entry = SystemCatalog::INTERNAL_SERVER_ERROR;
        Self::new(operation, entry, entry.message).with_detail(detail)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Attach a cause for the logs
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// HTTP status of the catalog entry
    pub fn status(&self) -> StatusCode {
        self.entry.status
    }

    /// Transient failures that may succeed on retry
    pub fn is_retriable(&self) -> bool {
        self.status() == StatusCode::SERVICE_UNAVAILABLE
    }

    fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.entry.code.to_string(),
            category: self.entry.category.to_string(),
            module: self.entry.module.to_string(),
            message_key: self.entry.message_key.to_string(),
            field_errors: self.field_errors.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.entry.code, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                operation = %self.operation,
                code = self.entry.code,
                category = self.entry.category,
                module = self.entry.module,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                detail = ?self.detail,
                retriable = self.is_retriable(),
                "API error: {}", self.message
            );
        } else {
            tracing::warn!(
                operation = %self.operation,
                code = self.entry.code,
                category = self.entry.category,
                module = self.entry.module,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                "API error: {}", self.message
            );
        }

        let body = self.body();
        let response = ApiResponse::failure(self.message, body).with_meta(ResponseMeta::now());
        (status, Json(response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::new(ApiOperation::Get, err.entry, err.message())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let entry = match err.kind {
            RepositoryErrorKind::AlreadyExists | RepositoryErrorKind::ConstraintViolation => {
                SystemCatalog::DATA_INTEGRITY_VIOLATION
            }
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout => {
                SystemCatalog::DATABASE_CONNECTION_ERROR
            }
            RepositoryErrorKind::NotFound => SystemCatalog::DATA_RESOURCE_NOT_FOUND,
            RepositoryErrorKind::DatabaseError
            | RepositoryErrorKind::SerializationError
            | RepositoryErrorKind::Other => SystemCatalog::INTERNAL_SERVER_ERROR,
        };

        // Never expose storage messages for server-side failures
        let message = if entry.status.is_server_error() {
            entry.message.to_string()
        } else {
            err.message.clone()
        };

        Self {
            operation: err.operation.into(),
            entry,
            message,
            field_errors: BTreeMap::new(),
            entity_type: err.entity_type.clone(),
            entity_id: err.entity_id.clone(),
            detail: Some(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let entry = SystemCatalog::VALIDATION_ERROR;
        let mut err = Self::new(ApiOperation::Create, entry, entry.message);
        err.field_errors = errors.fields().clone();
        err
    }
}

impl From<Infallible> for ApiError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl<D: Into<ApiError>> From<CrudError<D>> for ApiError {
    fn from(err: CrudError<D>) -> Self {
        match err {
            CrudError::Domain(domain) => domain.into(),
            CrudError::Duplicate(columns) => {
                let mut errors = ValidationErrors::new();
                for column in columns {
                    errors.add(column, "validation.unique");
                }
                errors.into()
            }
            CrudError::Repository(repository) => repository.into(),
        }
    }
}
