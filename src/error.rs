//! Unified error handling for the HTTP surface.
//!
//! Every handler returns `Result<T, AppError>`. The response body always carries a
//! `success: false` flag and a human-readable message; validation failures also
//! list the offending fields.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{mailer::MailError, repository::RepoError, storage::StorageError};

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collects field errors while a request body is checked, then converts into
/// a single `AppError::Validation` if anything was recorded.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Records `field` as missing when the value is absent or blank.
    pub fn require(&mut self, field: &str, value: Option<&str>) {
        if value.is_none_or(|v| v.trim().is_empty()) {
            self.push(field, format!("{field} is required"));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turns the collected errors into a result, using `message` as the summary.
    pub fn finish(self, message: &str) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation {
                message: message.to_string(),
                fields: self.0,
            })
        }
    }
}

/// Application-level error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input.
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    /// No credential, or a credential that failed verification for any reason.
    #[error("Not authorized to access this route")]
    Unauthorized,

    /// Login attempt with an unknown email or a wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Valid credential, insufficient role.
    #[error("Not authorized to perform this action")]
    Forbidden,

    /// The identifier has no matching document.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness violation.
    #[error("{0}")]
    Conflict(String),

    /// A write (or a read without a demo fallback) while the store is unreachable.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Image host failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Unexpected store or runtime failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a validation error without field detail.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// The canonical "database unreachable" error.
    pub fn store_unavailable() -> Self {
        Self::ServiceUnavailable(
            "Service temporarily unavailable: the database is not reachable".to_string(),
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Conflict(message) => Self::Conflict(message),
            RepoError::Database(db) if is_connectivity_failure(&db) => {
                tracing::warn!(error = %db, "store unreachable mid-request");
                Self::store_unavailable()
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(format!("token signing failed: {err}"))
    }
}

fn is_connectivity_failure(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
    )
}

/// Wire shape of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Internal(_) | Self::Storage(_) => {
                tracing::error!(error = %self, "request failed");
            }
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "request refused"),
            _ => tracing::debug!(error = %self, status = status.as_u16(), "request rejected"),
        }

        // Internal details stay in the logs.
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Storage(_) => "Image upload failed".to_string(),
            _ => self.to_string(),
        };
        let errors = match self {
            Self::Validation { fields, .. } => fields,
            _ => Vec::new(),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
                errors,
            }),
        )
            .into_response()
    }
}
