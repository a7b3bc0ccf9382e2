//! Framework errors
//!
//! Startup and infrastructure failures: configuration, I/O, tracing setup,
//! database connection. Request-level failures use
//! [`ApiError`](crate::handlers::ApiError) instead.

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::catalog::SystemCatalog;
use crate::handlers::{ApiError, ApiOperation};

/// Result type alias using the framework error
pub type Result<T> = std::result::Result<T, Error>;

/// Framework error
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Database pool could not be created
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(String),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(Box<axum::http::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<axum::http::Error> for Error {
    fn from(err: axum::http::Error) -> Self {
        Error::Http(Box::new(err))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let entry = match self {
            #[cfg(feature = "database")]
            Error::Database(_) => SystemCatalog::DATABASE_CONNECTION_ERROR,
            _ => SystemCatalog::INTERNAL_SERVER_ERROR,
        };

        ApiError::new(ApiOperation::Route, entry, entry.message)
            .with_detail(self.to_string())
            .into_response()
    }
}
