//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the POS API                            │
//! │                                                                         │
//! │  Till                        Rust Backend                               │
//! │  ────                        ────────────                               │
//! │                                                                         │
//! │  POST /api/pos/orders                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler                                                         │  │
//! │  │  Result<ApiResponse<T>, ApiError>                                │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Error? ─── CoreError::InsufficientStock ─ ApiError ──►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄──── 400 { "success": false, "code": "INSUFFICIENT_STOCK",            │
//! │              "message": "Insufficient stock for Whey Protein: ..." }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store failures are logged in full and answered with a generic message.

use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use atlas_core::{CoreError, ValidationError};
use atlas_db::{CatalogError, CheckoutError, DbError};

/// API error returned from handlers.
///
/// ## Serialization
/// This is what the till receives when a request fails:
/// ```json
/// {
///   "success": false,
///   "code": "NOT_FOUND",
///   "message": "Parked cart not found: 12"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in the Till
/// ```typescript
/// const res = await fetch('/api/pos/orders', { method: 'POST', body });
/// const body = await res.json();
/// if (!body.success) {
///   switch (body.code) {
///     case 'INSUFFICIENT_STOCK':
///       showStockWarning(body.message);
///       break;
///     case 'INVALID_AMOUNT':
///       askForMoreCash(body.message);
///       break;
///     default:
///       showError(body.message);
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Not enough stock for a cart line (400)
    InsufficientStock,

    /// Short payment or oversized discount (400)
    InvalidAmount,

    /// Database operation failed (500)
    DatabaseError,

    /// Database busy past its timeout; retry (503)
    Unavailable,

    /// No operator on the request (401)
    Unauthorized,

    /// Operator lacks the required role (403)
    Forbidden,

    /// Request body over the configured limit (413)
    PayloadTooLarge,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::InsufficientStock | ErrorCode::InvalidAmount => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
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
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: ErrorCode,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            code: self.code,
            message: &self.message,
        });

        (self.code.status(), body).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::warn!("Check constraint violation: {}", message);
                ApiError::validation("Value violates a data constraint")
            }
            DbError::Busy | DbError::PoolExhausted => {
                tracing::warn!(error = %err, "Database unavailable");
                ApiError::new(ErrorCode::Unavailable, "Database is busy, please retry")
            }
            DbError::UniqueViolation { .. }
            | DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Internal(_) => {
                // Log the actual error but return a generic message
                tracing::error!(error = %err, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::InsufficientStock { .. } => ApiError::new(ErrorCode::InsufficientStock, err.to_string()),
            CoreError::InvalidAmount { .. } => ApiError::new(ErrorCode::InvalidAmount, err.to_string()),
            CoreError::InvalidOrderStatus { .. } => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Core(e) => e.into(),
            CheckoutError::Db(e) => e.into(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(e) => e.into(),
            CatalogError::Db(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        rejected_body(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        rejected_body(rejection.status(), rejection.body_text())
    }
}

fn rejected_body(status: StatusCode, text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(ErrorCode::PayloadTooLarge, "Request body is too large")
    } else {
        ApiError::validation(text)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
