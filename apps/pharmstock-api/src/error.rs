//! # API Error Type
//!
//! Unified error type for the service façade and HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in PharmStock                             │
//! │                                                                         │
//! │  Client                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  PUT /api/inventory/7                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler → InventoryService                                      │  │
//! │  │  Result<Outcome<T>, ApiError>                                    │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Bad body / path? ─── JsonRejection / PathRejection ─┐           │  │
//! │  │         │                                            │           │  │
//! │  │         ▼                                            ▼           │  │
//! │  │  Validation Error? ─── ValidationError ─────────── ApiError ────►│  │
//! │  │         │                                            ▲           │  │
//! │  │         ▼                                            │           │  │
//! │  │  Store Error? ──────── DbError::UniqueViolation ─────┘           │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ── Outcome::Accepted(record) ──────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄──── 409 { "code": "CONFLICT",                                       │
//! │              "message": "barcode '8901234567890' already exists",       │
//! │              "field": "barcode" }                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use pharmstock_core::{CoreError, ValidationError};
use pharmstock_db::DbError;

/// API error returned from the façade and every handler.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "price must be greater than or equal to 0",
///   "field": "price"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Offending input field, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Barcode already in use (409)
    Conflict,

    /// Payload failed field validation (400)
    ValidationError,

    /// Malformed non-field argument (400)
    InvalidArgument,

    /// Record store unreachable (503)
    StoreUnavailable,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ValidationError | ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Attaches the offending field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidArgument, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Converts store errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            )
            .with_field(field),
            DbError::ConnectionFailed(e) => {
                error!("Store connection failed: {}", e);
                ApiError::new(ErrorCode::StoreUnavailable, "Record store unavailable")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::StoreUnavailable, "Record store busy")
            }
            DbError::MigrationFailed(e) => {
                error!("Migration failed: {}", e);
                ApiError::internal("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::internal("Database operation failed")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::internal("Database operation failed")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        ApiError::validation(err.to_string()).with_field(field)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidArgument { name, reason } => {
                ApiError::invalid_argument(format!("{} {}", name, reason)).with_field(name)
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        if !matches!(rejection, JsonRejection::JsonDataError(_)) {
            return ApiError::validation(message);
        }

        if let Some(field) = missing_field(&message) {
            return ValidationError::Required { field }.into();
        }
        match invalid_field(&message) {
            Some(field) => ApiError::validation(message).with_field(field),
            None => ApiError::validation(message),
        }
    }
}

/// Field named by serde's "missing field `x`" message.
fn missing_field(message: &str) -> Option<String> {
    let (_, rest) = message.split_once("missing field `")?;
    let (field, _) = rest.split_once('`')?;
    Some(field.to_string())
}

/// Leading `field: ...` path of a type error on a top-level field.
fn invalid_field(message: &str) -> Option<String> {
    let detail = message
        .split_once("target type: ")
        .map_or(message, |(_, detail)| detail);
    let (path, _) = detail.split_once(": ")?;
    let is_field = !path.is_empty() && path.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    is_field.then(|| path.to_string())
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_argument(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_argument(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
