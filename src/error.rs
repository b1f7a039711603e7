//! Error taxonomy shared by every handler and lifecycle operation.
//!
//! All variants render the same JSON envelope:
//! `{"error": {"code": "...", "message": "...", "details": {...}}}`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::model::leave_request::LeaveType;

pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "Validation failed")]
    Validation(FieldErrors),

    #[display(fmt = "Invalid credentials")]
    InvalidCredentials,

    #[display(fmt = "Invalid or expired credential: {}", _0)]
    InvalidOrExpiredCredential(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    InvalidState(String),

    #[display(
        fmt = "Insufficient {} leave balance: {} day(s) available, {} requested",
        leave_type,
        available,
        requested
    )]
    InsufficientBalance {
        leave_type: LeaveType,
        available: i64,
        requested: i64,
    },

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Single field validation error
    pub fn validation_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self::Validation(errors)
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidOrExpiredCredential(_) => "invalid_or_expired_credential",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidState(_) => "invalid_state",
            AppError::InsufficientBalance { .. } => "insufficient_balance",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Validation(errors) if errors.len() == 1 => errors
                .values()
                .next()
                .and_then(|messages| messages.first())
                .cloned()
                .unwrap_or_else(|| self.to_string()),
            AppError::Validation(errors) => {
                format!("Validation failed for {} fields", errors.len())
            }
            _ => self.to_string(),
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::Validation(errors) => Some(json!(errors)),
            AppError::InsufficientBalance {
                leave_type,
                available,
                requested,
            } => Some(json!({
                "leave_type": leave_type,
                "available": available,
                "requested": requested,
            })),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidOrExpiredCredential(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_)
            | AppError::InsufficientBalance { .. }
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "code": self.code(),
            "message": self.message(),
        });
        if let Some(details) = self.details() {
            body["details"] = details;
        }

        HttpResponse::build(self.status_code()).json(json!({ "error": body }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Resource not found"),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("A resource with this identifier already exists".to_string())
            }
            _ => {
                tracing::error!(error = %err, "Database error");
                AppError::internal("A database error occurred")
            }
        }
    }
}

/// Collects field-level messages before failing a request.
#[derive(Debug, Default)]
pub struct ValidationErrorBuilder {
    errors: FieldErrors,
}

impl ValidationErrorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Return Ok(()) if no errors were added
    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}
