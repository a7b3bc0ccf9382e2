//! Error catalog and message namespaces
//!
//! Every error a service can return is a [`CatalogEntry`]: a stable code, a
//! category, the module it belongs to, a message key for client-side
//! localisation, a default message and the HTTP status. Resource types declare
//! their own entries (usually one `RES-XXX-0001` not-found entry) and return
//! them as [`DomainError`]s from their `on_not_found` hook.
//!
//! # Example
//!
//! ```rust
//! use entity_rest::catalog::{CatalogEntry, DomainError, MessageNamespace};
//! use http::StatusCode;
//!
//! const USER_NOT_FOUND: CatalogEntry = CatalogEntry::new(
//!     "RES-USR-0001",
//!     "Resource",
//!     "User",
//!     "error.user.not.found",
//!     "User {0} was not found",
//!     StatusCode::NOT_FOUND,
//! );
//!
//! let err = DomainError::new(USER_NOT_FOUND).with_arg("42");
//! assert_eq!(err.message(), "User 42 was not found");
//! assert_eq!(err.status(), StatusCode::NOT_FOUND);
//!
//! let users = MessageNamespace::new("user");
//! assert_eq!(users.key("created"), "user.created");
//! ```

use std::borrow::Cow;
use std::fmt;

use http::StatusCode;

/// One catalogued error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Stable machine-readable code, e.g. `RES-USR-0001`
    pub code: &'static str,
    /// Broad category, e.g. `Resource`, `Validation`, `System`
    pub category: &'static str,
    /// Owning module, e.g. `User`
    pub module: &'static str,
    /// Localisation key, e.g. `error.user.not.found`
    pub message_key: &'static str,
    /// Default message; `{0}`, `{1}`, ... are replaced by arguments
    pub message: &'static str,
    /// HTTP status the error maps to
    pub status: StatusCode,
}

impl CatalogEntry {
    /// Create an entry
    pub const fn new(
        code: &'static str,
        category: &'static str,
        module: &'static str,
        message_key: &'static str,
        message: &'static str,
        status: StatusCode,
    ) -> Self {
        Self {
            code,
            category,
            module,
            message_key,
            message,
            status,
        }
    }
}

/// Entries shared by every service
pub struct SystemCatalog;

impl SystemCatalog {
    /// Unexpected failure
    pub const INTERNAL_SERVER_ERROR: CatalogEntry = CatalogEntry::new(
        "SYS-5001",
        "System",
        "Core",
        "error.system.internal.server.error",
        "An internal error occurred",
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    /// Service cannot take requests right now
    pub const SERVICE_UNAVAILABLE: CatalogEntry = CatalogEntry::new(
        "SYS-5031",
        "System",
        "Core",
        "error.system.service.unavailable",
        "Service temporarily unavailable",
        StatusCode::SERVICE_UNAVAILABLE,
    );

    /// No route matches the request path
    pub const ROUTE_NOT_FOUND: CatalogEntry = CatalogEntry::new(
        "REQ-4041",
        "Request",
        "Routing",
        "error.request.route.not.found",
        "No route for {0}",
        StatusCode::NOT_FOUND,
    );

    /// Route exists but not for this method
    pub const METHOD_NOT_SUPPORTED: CatalogEntry = CatalogEntry::new(
        "REQ-4051",
        "Request",
        "Routing",
        "error.request.method.not.supported",
        "Method not supported",
        StatusCode::METHOD_NOT_ALLOWED,
    );

    /// Unreadable body or path parameter
    pub const MALFORMED_REQUEST: CatalogEntry = CatalogEntry::new(
        "REQ-4001",
        "Request",
        "Validation",
        "error.request.malformed",
        "Malformed request: {0}",
        StatusCode::BAD_REQUEST,
    );

    /// Request body failed validation
    pub const VALIDATION_ERROR: CatalogEntry = CatalogEntry::new(
        "VAL-4001",
        "Validation",
        "Core",
        "error.validation",
        "Validation failed",
        StatusCode::UNPROCESSABLE_ENTITY,
    );

    /// Unique or foreign-key constraint rejected the write
    pub const DATA_INTEGRITY_VIOLATION: CatalogEntry = CatalogEntry::new(
        "DAT-4091",
        "Data",
        "Persistence",
        "error.data.integrity.violation",
        "The request conflicts with existing data",
        StatusCode::CONFLICT,
    );

    /// Storage is unreachable or timed out
    pub const DATABASE_CONNECTION_ERROR: CatalogEntry = CatalogEntry::new(
        "DAT-5031",
        "Data",
        "Persistence",
        "error.data.connection",
        "Service temporarily unavailable",
        StatusCode::SERVICE_UNAVAILABLE,
    );

    /// Storage reported a missing row
    pub const DATA_RESOURCE_NOT_FOUND: CatalogEntry = CatalogEntry::new(
        "DAT-4041",
        "Data",
        "Persistence",
        "error.data.resource.not.found",
        "Resource not found",
        StatusCode::NOT_FOUND,
    );
}

/// A catalogued error with message arguments
///
/// The usual `on_not_found` return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    /// Catalog entry
    pub entry: CatalogEntry,
    /// Positional message arguments
    pub args: Vec<String>,
}

impl DomainError {
    /// Error for `entry` with no arguments
    pub fn new(entry: CatalogEntry) -> Self {
        Self {
            entry,
            args: Vec::new(),
        }
    }

    /// Append a message argument
    #[must_use]
    pub fn with_arg(mut self, arg: impl fmt::Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Default message with arguments substituted
    pub fn message(&self) -> String {
        render(self.entry.message, &self.args)
    }

    /// HTTP status of the entry
    pub fn status(&self) -> StatusCode {
        self.entry.status
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.entry.code, self.message())
    }
}

impl std::error::Error for DomainError {}

impl From<CatalogEntry> for DomainError {
    fn from(entry: CatalogEntry) -> Self {
        Self::new(entry)
    }
}

/// Replace `{0}`, `{1}`, ... in `template`; unmatched placeholders stay as-is
pub fn render(template: &str, args: &[String]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |acc, (i, arg)| {
            acc.replace(&format!("{{{i}}}"), arg)
        })
}

/// Prefix for a resource's message keys
///
/// Passed explicitly to whatever builds messages; there is no ambient
/// "current namespace".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageNamespace(Cow<'static, str>);

impl MessageNamespace {
    /// Namespace `name`, e.g. `"user"`
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Namespace name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `"{namespace}.{suffix}"`
    pub fn key(&self, suffix: &str) -> String {
        format!("{}.{}", self.0, suffix)
    }
}

impl fmt::Display for MessageNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
