//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in SmartSales                             │
//! │                                                                         │
//! │  Client                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  POST /cart/checkout                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  ServiceError::Core(InsufficientStock) ──► 409 ──┐              │  │
//! │  │  ServiceError::Db(NotFound)            ──► 404 ──┤              │  │
//! │  │  ServiceError::Gateway(..)             ──► 502 ──┼─► ApiError ─►│  │
//! │  │  ServiceError::QueryExecution          ──► 500 ──┘              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄── { "code": "INSUFFICIENT_STOCK",                                    │
//! │        "message": "Insufficient stock for Mouse: available 2, ..." }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage and report-query failures are logged here and reach the client
//! only as a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::render::RenderError;
use crate::transcription::TranscriptionError;
use smartsales_core::gateway::GatewayError;
use smartsales_core::{CoreError, ValidationError};
use smartsales_db::{DbError, ServiceError};

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 3f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Missing caller identity header (401)
    Unauthorized,

    /// Database operation failed (500)
    DatabaseError,

    /// Business rule rejected the request (409)
    BusinessLogic,

    /// Cart is empty or holds an unsellable product (409)
    CartError,

    /// Insufficient stock (409)
    InsufficientStock,

    /// Payment provider failed (502)
    PaymentError,

    /// Webhook signature rejected (400)
    InvalidSignature,

    /// Generated report query failed (500)
    ReportError,

    /// Speech could not be recognized (400)
    UnrecognizedAudio,

    /// A collaborator is down or not configured (503)
    ServiceUnavailable,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::InvalidSignature | ErrorCode::UnrecognizedAudio => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::BusinessLogic | ErrorCode::CartError | ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::PaymentError => StatusCode::BAD_GATEWAY,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError | ErrorCode::ReportError | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Conversions
// =============================================================================

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { constraint } => {
                ApiError::validation(format!("A record with this {constraint} already exists"))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::warn!("Check constraint violation: {}", message);
                ApiError::validation("Value violates a constraint")
            }
            DbError::PoolExhausted => ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted"),
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InsufficientStock { .. } => ApiError::new(ErrorCode::InsufficientStock, message),
            CoreError::EmptyCart | CoreError::ProductInactive(_) => ApiError::new(ErrorCode::CartError, message),
            CoreError::IllegalTransition { .. } => {
                tracing::warn!(error = %message, "Rejected state transition");
                ApiError::new(ErrorCode::BusinessLogic, message)
            }
            CoreError::InvalidPaymentAmount { .. } => ApiError::validation(message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidSignature(reason) => {
                tracing::warn!(reason = %reason, "Webhook signature rejected");
                ApiError::new(ErrorCode::InvalidSignature, "Invalid webhook signature")
            }
            other => {
                tracing::error!(error = %other, "Payment gateway failure");
                ApiError::new(ErrorCode::PaymentError, other.to_string())
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(e) => e.into(),
            ServiceError::Db(e) => e.into(),
            ServiceError::Gateway(e) => e.into(),
            ServiceError::QueryExecution(e) => {
                tracing::error!(error = %e, "Report query failed");
                ApiError::new(ErrorCode::ReportError, "Report query failed")
            }
        }
    }
}

impl From<TranscriptionError> for ApiError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::Unrecognized => ApiError::new(ErrorCode::UnrecognizedAudio, err.to_string()),
            TranscriptionError::Unavailable(ref reason) => {
                tracing::error!(reason = %reason, "Transcription unavailable");
                ApiError::new(ErrorCode::ServiceUnavailable, err.to_string())
            }
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        tracing::error!(error = %err, "Report rendering failed");
        ApiError::internal("Report rendering failed")
    }
}
