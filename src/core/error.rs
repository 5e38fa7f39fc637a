//! Error types - pipeline errors and their HTTP rendering

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Errors raised by the fetch / join / export pipeline
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A required field is missing or malformed; the user has to fix the form
    #[error("{0}")]
    InvalidInput(String),

    /// LMS answered 401
    #[error("invalid API key or unauthorized")]
    Unauthorized,

    /// LMS answered 404
    #[error("course not found")]
    NotFound,

    /// LMS answered 403
    #[error("permission denied: the API key cannot access this course")]
    PermissionDenied,

    /// LMS answered with a 5xx status
    #[error("LMS unavailable (HTTP {status})")]
    UpstreamUnavailable { status: u16 },

    #[error("could not connect to the LMS: {0}")]
    Connectivity(String),

    #[error("LMS request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Any other transport failure, unexpected status or undecodable body
    #[error("failed to fetch data from the LMS: {0}")]
    Fetch(String),

    /// Local I/O failure while writing the CSV artifact
    #[error("failed to export CSV: {0}")]
    Export(String),
}

impl ExtractError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether resubmitting the same request may succeed.
    /// Nothing in the service retries on its own.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidInput(_) | Self::Unauthorized | Self::NotFound
        )
    }

    /// HTTP status used when the error reaches the request boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_)
            | Self::Unauthorized
            | Self::NotFound
            | Self::PermissionDenied => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Converts a pipeline error into a response.
    /// Client-side errors keep their message; upstream and local failures get a
    /// generic message and carry the cause only when `verbose` is set.
    pub fn from_extract(err: ExtractError, verbose: bool) -> Self {
        let status = err.status_code();
        let retryable = err.is_retryable();
        if status.is_client_error() {
            warn!(retryable, "Request rejected: {}", err);
            return Self::new(status, err.to_string());
        }

        error!(retryable, "Request failed: {}", err);
        let message = match &err {
            ExtractError::Export(_) => "Export failed, please try again later",
            _ => "The LMS could not be reached, please try again later",
        };
        let app_error = Self::new(status, message);
        if verbose {
            app_error.with_details(err.to_string())
        } else {
            app_error
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request("Validation error").with_details(err.to_string())
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        error!("Template rendering failed: {:?}", err);
        Self::internal_server_error("Internal server error")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}
