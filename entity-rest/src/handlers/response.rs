//! Response envelope for REST handlers
//!
//! Every endpoint answers with the same [`ApiResponse`] shape:
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "user.fetched",
//!   "pagination": {"type": "CURSOR", "per_page": 20, "has_more": false, "next_cursor": null},
//!   "meta": {"request_id": "3f1c...", "timestamp": "2024-05-01T12:00:00Z"},
//!   "data": [...]
//! }
//! ```
//!
//! Failures carry an `errors` block instead of `data`.
//!
//! # Example
//!
//! ```rust
//! use entity_rest::crud::{PageInfo, PaginatedResult};
//! use entity_rest::handlers::ApiResponse;
//!
//! let page = PaginatedResult::new(vec!["a", "b"], PageInfo::length_aware(0, 20, 2));
//! let response = ApiResponse::page("tag.fetched", page);
//!
//! assert!(response.success);
//! assert_eq!(response.data.as_deref(), Some(&["a", "b"][..]));
//! assert_eq!(response.pagination.and_then(|p| p.total_items()), Some(2));
//! ```

use std::collections::BTreeMap;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crud::{PageInfo, PaginatedResult};

/// Metadata attached to every response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMeta {
    /// The unique identifier for this request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// When the response was produced
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    /// Metadata stamped with the current time
    pub fn now() -> Self {
        Self {
            request_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the request ID
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self::now()
    }
}

/// Structured error block of a failed response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Catalog code, e.g. `RES-USR-0001`
    pub code: String,
    /// Catalog category
    pub category: String,
    /// Owning module
    pub module: String,
    /// Localisation key
    pub message_key: String,
    /// Validation messages grouped by field
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, Vec<String>>,
}

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Message or message key
    pub message: String,
    /// Pagination block of list responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
    /// Request metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    /// Payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error details of a failed response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            pagination: None,
            meta: None,
            data: Some(data),
            errors: None,
        }
    }

    /// Set the metadata
    #[must_use]
    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Successful list response; rows keep the order they were returned in
    pub fn page(message: impl Into<String>, result: PaginatedResult<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            pagination: Some(result.pagination),
            meta: None,
            data: Some(result.data),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// Failed response carrying an error block
    pub fn failure(message: impl Into<String>, errors: ErrorBody) -> Self {
        Self {
            success: false,
            message: message.into(),
            pagination: None,
            meta: None,
            data: None,
            errors: Some(errors),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// 201 Created with a `Location` header
#[derive(Debug, Clone)]
pub struct Created<T> {
    /// Path of the new resource
    pub location: String,
    /// Envelope with the created entity
    pub body: ApiResponse<T>,
}

impl<T> Created<T> {
    /// Created response pointing at `location`
    pub fn new(location: impl Into<String>, body: ApiResponse<T>) -> Self {
        Self {
            location: location.into(),
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::CREATED, Json(self.body)).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.location) {
            response.headers_mut().insert(header::LOCATION, value);
        }
        response
    }
}

/// 204 No Content
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}
