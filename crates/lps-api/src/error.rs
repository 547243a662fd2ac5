use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lps_core::window::WindowError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Already done: {0}")]
    AlreadyDone(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) | Self::Jwt(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::AlreadyDone(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-usable error code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) | Self::Jwt(_) => "unauthenticated",
            Self::Validation(_) => "validation_error",
            Self::AlreadyDone(_) => "already_done",
            Self::NotFound(_) => "not_found",
            Self::Database(_) => "storage_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message safe to show to the client
    fn public_message(&self) -> String {
        match self {
            Self::Unauthenticated(msg)
            | Self::Validation(msg)
            | Self::AlreadyDone(msg)
            | Self::NotFound(msg) => msg.clone(),
            Self::Jwt(_) => "Invalid or expired token".to_string(),
            Self::Database(_) => "The data store is unavailable, please retry later".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Database(e) => tracing::error!(error = %e, "Storage error"),
            Self::Internal(msg) => tracing::error!(error = %msg, "Internal error"),
            other => tracing::debug!(code = other.code(), "Request rejected: {other}"),
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<WindowError> for ApiError {
    fn from(error: WindowError) -> Self {
        Self::Validation(error.to_string())
    }
}
