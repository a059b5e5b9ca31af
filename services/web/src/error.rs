//! services/web/src/error.rs
//!
//! Defines the primary error type for the entire web service, and how it is
//! shown to the browser when a handler gives up.

use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use routine_tracker_core::ports::PortError;
use tracing::error;

use crate::config::ConfigError;
use crate::seed::SeedError;
use crate::web::flash::Notice;
use crate::web::views::{self, Page};

/// The primary error type for the `web` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core repository ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while loading the bundled exercise catalog.
    #[error("Seed Error: {0}")]
    Seed(#[from] SeedError),

    /// Represents a header value that could not be encoded (e.g., a cookie).
    #[error("Header Error: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Port(PortError::NotFound(what)) => (StatusCode::NOT_FOUND, what.clone()),
            ApiError::Port(PortError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            ApiError::Port(PortError::Conflict(message)) => (StatusCode::CONFLICT, message.clone()),
            ApiError::Port(PortError::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                "You are not allowed to do that.".to_string(),
            ),
            _ => {
                error!("Request failed: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        };

        Page::new("Something went wrong", views::error_body(&message))
            .status(status)
            .notice(Notice::danger(message))
            .into_response()
    }
}
