//! Core error types with HTTP status code mapping.
//!
//! [`CoreError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Duplicate webhook deliveries are deliberately *not* an error: ingestion
//! reports them as a successful idempotent no-op (see
//! [`crate::service::IngestOutcome`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::ContainerStatus;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "container not found: …",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`CoreError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request / 422      |
/// | 2000–2099 | Not Found       | 404 Not Found              |
/// | 2100–2199 | Conflict        | 409 Conflict               |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Request validation failed (malformed or missing input).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A status change would move the container backwards in its
    /// forward-only lifecycle.
    #[error("status regression from {from} to {to} is not allowed")]
    StatusRegression {
        /// Current status of the container.
        from: ContainerStatus,
        /// Requested (earlier) status.
        to: ContainerStatus,
    },

    /// Container with the given ID was not found.
    #[error("container not found: {0}")]
    ContainerNotFound(uuid::Uuid),

    /// No container matches the given carrier tracking number.
    #[error("no container matches tracking number: {0}")]
    TrackingNumberNotFound(String),

    /// Shipment with the given ID was not found.
    #[error("shipment not found: {0}")]
    ShipmentNotFound(uuid::Uuid),

    /// Ledger account for the given user was required but absent.
    #[error("account not found: {0}")]
    AccountNotFound(uuid::Uuid),

    /// Transaction serialization conflict that persisted after the
    /// automatic retry. Safe for the caller to retry.
    #[error("concurrent update conflict: {0}")]
    ConcurrencyConflict(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::StatusRegression { .. } => 1002,
            Self::ContainerNotFound(_) => 2001,
            Self::TrackingNumberNotFound(_) => 2002,
            Self::ShipmentNotFound(_) => 2003,
            Self::AccountNotFound(_) => 2004,
            Self::ConcurrencyConflict(_) => 2101,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::StatusRegression { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ContainerNotFound(_)
            | Self::TrackingNumberNotFound(_)
            | Self::ShipmentNotFound(_)
            | Self::AccountNotFound(_) => StatusCode::NOT_FOUND,
            Self::ConcurrencyConflict(_) => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
