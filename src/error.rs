//! Application error type shared by repositories, services and handlers.
//!
//! Every variant maps to one HTTP status and a stable machine-readable `code`
//! in the JSON error envelope:
//!
//! ```json
//! { "error": { "code": "already_exempted", "message": "...", "details": {} } }
//! ```

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Error payload rendered inside the response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    Forbidden { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// A fee period for the same year and semester already exists.
    #[error("fee period {year}-{semester} already exists")]
    DuplicatePeriod { year: i32, semester: u8 },

    /// The member already holds an exemption in the period.
    #[error("member {member_id} is already exempted for {year}-{semester}")]
    AlreadyExempted {
        year: i32,
        semester: u8,
        member_id: String,
    },

    /// The store could not be reached or a call timed out.
    #[error("{message}")]
    Unavailable { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. }
            | AppError::DuplicatePeriod { .. }
            | AppError::AlreadyExempted { .. } => StatusCode::CONFLICT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its wire representation.
    pub fn into_error_info(self) -> ErrorInfo {
        let message = self.to_string();
        let (code, details) = match self {
            AppError::Validation { details, .. } => ("validation_error", details),
            AppError::Unauthorized { details, .. } => ("unauthorized", details),
            AppError::Forbidden { details, .. } => ("forbidden", details),
            AppError::NotFound { details, .. } => ("not_found", details),
            AppError::Conflict { details, .. } => ("conflict", details),
            AppError::DuplicatePeriod { year, semester } => (
                "duplicate_period",
                json!({ "year": year, "semester": semester }),
            ),
            AppError::AlreadyExempted {
                year,
                semester,
                member_id,
            } => (
                "already_exempted",
                json!({ "year": year, "semester": semester, "member_id": member_id }),
            ),
            AppError::Unavailable { details, .. } => ("store_unavailable", details),
            AppError::Internal { details, .. } => ("internal_error", details),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let is_unauthorized = matches!(self, AppError::Unauthorized { .. });

        let body = ErrorBody {
            error: self.into_error_info(),
        };

        let mut response = (status, Json(body)).into_response();
        if is_unauthorized {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

/// PostgreSQL `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                tracing::error!(error = %e, "Store unavailable");
                return AppError::unavailable("Store unavailable", json!({}));
            }
            sqlx::Error::RowNotFound => {
                return AppError::not_found("Record not found", json!({}));
            }
            _ => {}
        }

        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": db.constraint() }),
                );
            }
            if db.code().as_deref() == Some(QUERY_CANCELED) {
                tracing::error!(error = %e, "Store call timed out");
                return AppError::unavailable("Store call timed out", json!({}));
            }
        }

        tracing::error!(error = %e, "Database error");
        AppError::internal("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::bad_request(
            "Validation failed",
            serde_json::to_value(&errors).unwrap_or_default(),
        )
    }
}
