//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps refusals from the onboarding state machines to HTTP status codes
//! and returns a JSON body with a machine-readable code, a message and,
//! for input problems, details naming the offending field.
//! Internal error details are never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use onboard_client::GatewayError;
use onboard_state::{
    BankLookupError, CatalogFailure, OtpError, RecordError, ReviewError, SessionError,
    ValidationFailure,
};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    pub message: String,
    /// Present only for client errors that point at a field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Input failed a business rule (422).
    #[error("{0}")]
    Validation(String),

    /// Input failed a rule tied to a specific field (422, with details).
    #[error("{message}")]
    InvalidField {
        message: String,
        details: serde_json::Value,
    },

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The action does not fit the current state (409).
    #[error("{0}")]
    Conflict(String),

    /// A collaborator is missing or refused to answer (503).
    #[error("{0}")]
    ServiceUnavailable(String),

    /// A collaborator did not answer in time (504).
    #[error("{0}")]
    GatewayTimeout(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) | Self::InvalidField { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::GatewayTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let (message, details) = match self {
            Self::Internal(_) => ("An internal error occurred".to_string(), None),
            Self::InvalidField { message, details } => (message, Some(details)),
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<onboard_core::ValidationError> for AppError {
    fn from(err: onboard_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ValidationFailure> for AppError {
    fn from(failure: ValidationFailure) -> Self {
        let details = serde_json::json!({
            "step": failure.step,
            "field": failure.field,
        });
        Self::InvalidField {
            message: failure.message,
            details,
        }
    }
}

impl From<CatalogFailure> for AppError {
    fn from(failure: CatalogFailure) -> Self {
        Self::InvalidField {
            details: serde_json::json!({ "field": failure.field }),
            message: failure.message,
        }
    }
}

impl From<OtpError> for AppError {
    fn from(err: OtpError) -> Self {
        match &err {
            OtpError::InvalidDestination { .. }
            | OtpError::NotADigit(_)
            | OtpError::NothingToPaste => Self::Validation(err.to_string()),
            OtpError::AlreadyVerified { .. }
            | OtpError::RequestInFlight { .. }
            | OtpError::AlreadySent { .. }
            | OtpError::NotSent { .. }
            | OtpError::NotAcceptingInput { .. } => Self::Conflict(err.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match &err {
            SessionError::Otp(e) => e.clone().into(),
            SessionError::Record(RecordError::ProductTypeNotSelected(_)) => {
                Self::Validation(err.to_string())
            }
            SessionError::Record(RecordError::LicenseKeysMismatch { .. }) => {
                Self::Internal(err.to_string())
            }
            SessionError::Submitted
            | SessionError::SubmissionInProgress
            | SessionError::ChannelLocked(_)
            | SessionError::Bank(BankLookupError::RequestInFlight { .. }) => {
                Self::Conflict(err.to_string())
            }
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match &err {
            ReviewError::UnknownItem(_) => Self::NotFound(err.to_string()),
            ReviewError::Closed(_) | ReviewError::RequestInFlight(_) => {
                Self::Conflict(err.to_string())
            }
            ReviewError::UnverifiedItems { pending } => Self::InvalidField {
                details: serde_json::json!({ "pending": pending }),
                message: err.to_string(),
            },
            ReviewError::CommentRequired(_) => Self::Validation(err.to_string()),
        }
    }
}

/// For calls whose failure has no state machine to absorb it, such as
/// loading a seller for review.
impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err.user_message() {
            Some(message) => Self::ServiceUnavailable(message),
            None => {
                tracing::warn!(error = %err, "collaborator call failed");
                Self::ServiceUnavailable("The service is unavailable. Please try again.".into())
            }
        }
    }
}
