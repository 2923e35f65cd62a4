//! Error types and handling for the travel relay.
//!
//! This module provides a unified error type [`AppError`] returned by the
//! upstream adapters and normalizers. Only its [`IntoResponse`] impl decides
//! which HTTP status a failure maps to.

use crate::normalizer::NormalizeError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Transport errors from the reqwest client
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Client provided invalid or incomplete data
    #[error("{0}")]
    BadRequest(String),

    /// Requested resource is not available
    #[error("{0}")]
    NotFound(String),

    /// An upstream service answered, but not with something usable
    #[error("{service} error: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// Upstream payload lacked fields the response contract requires
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// Generic internal server errors with custom message
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create an upstream error for the given service.
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Request(_)
            | AppError::Upstream { .. }
            | AppError::Normalize(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match &self {
            AppError::Request(e) if e.is_timeout() => "Upstream request timed out".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(
                request_id = %crate::core::logging::get_request_id(),
                status = status.as_u16(),
                error = %self,
                "Request failed"
            );
        }

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
