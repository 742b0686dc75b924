//! Error types for Libris server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Stable error codes, one per error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NotFound = 4,
    InsufficientCopies = 5,
    AlreadyReturned = 6,
    Conflict = 7,
    InvalidDateRange = 8,
    NoData = 9,
    BadValue = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No copies of book {book_id} are available")]
    InsufficientCopies { book_id: i64 },

    #[error("Loan {loan_id} has already been returned")]
    AlreadyReturned { loan_id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Expected return date {expected_return_date} is before issue date {issue_date}")]
    InvalidDateRange {
        issue_date: NaiveDate,
        expected_return_date: NaiveDate,
    },

    #[error("No data to export: {0}")]
    NoData(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable kind of this error, for callers that branch on it
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::InsufficientCopies { .. } => ErrorCode::InsufficientCopies,
            AppError::AlreadyReturned { .. } => ErrorCode::AlreadyReturned,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::InvalidDateRange { .. } => ErrorCode::InvalidDateRange,
            AppError::NoData(_) => ErrorCode::NoData,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Authentication(_) => ErrorCode::NotAuthorized,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Io(_) | AppError::Csv(_) | AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    /// Map a storage-level unique violation to `Conflict`, keep anything else
    pub fn from_unique_violation(err: sqlx::Error, message: impl Into<String>) -> Self {
        let is_unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);

        if is_unique {
            AppError::Conflict(message.into())
        } else {
            AppError::Database(err)
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::NotFound(_) | AppError::NoData(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InsufficientCopies { .. }
            | AppError::AlreadyReturned { .. }
            | AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidDateRange { .. } | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Io(_) | AppError::Csv(_) | AppError::Internal(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
