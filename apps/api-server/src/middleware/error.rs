//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use postpilot_core::error::{DomainError, RepoError};
use postpilot_core::ports::FileStoreError;
use postpilot_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Validation(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Validation(detail) => ErrorResponse::unprocessable(detail),
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Repository(e) => e.into(),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => {
                tracing::error!(error = %msg, "Database constraint violated");
                AppError::Internal("Database error".to_string())
            }
            RepoError::Connection(msg) => {
                tracing::error!(error = %msg, "Database connection error");
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!(error = %msg, "Database query error");
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<FileStoreError> for AppError {
    fn from(err: FileStoreError) -> Self {
        match err {
            FileStoreError::InvalidName(name) => {
                AppError::BadRequest(format!("Invalid file name {:?}", name))
            }
            FileStoreError::NotFound(name) => AppError::NotFound(format!("File {} not found", name)),
            FileStoreError::Io(e) => AppError::Internal(format!("File storage error: {}", e)),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
