//! # Error Types
//!
//! Domain-specific error types for atlas-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  atlas-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ProofError       - Malformed payment proof payloads               │
//! │                                                                         │
//! │  atlas-db errors                                                       │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CheckoutError    - CoreError | DbError during commit              │
//! │                                                                         │
//! │  pos-api errors                                                        │
//! │  └── ApiError         - What HTTP callers see                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while settling an order.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product is absent or no longer active.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Not enough stock to cover the requested quantity.
    ///
    /// ## When This Occurs
    /// ```text
    /// Cart: Whey Protein x3
    ///      │
    ///      ▼
    /// Re-read stock inside the commit: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Whey Protein", available: 2, requested: 3 }
    /// ```
    /// `requested` is the total for that product across the whole cart.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A monetary amount breaks a pricing rule (short payment, discount
    /// larger than the subtotal).
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Order is not in a state that allows the operation.
    #[error("Order {code} is {status}, cannot perform operation")]
    InvalidOrderStatus { code: String, status: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidAmount error.
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any mutation happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparsable percentage).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
}

// =============================================================================
// Proof Error
// =============================================================================

/// Embedded payment proof could not be decoded.
#[derive(Debug, Error)]
pub enum ProofError {
    /// `data:` URI without the `;base64,` marker.
    #[error("payload is not a base64 data URI")]
    NotBase64DataUri,

    /// Media type is not `image/*`.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Base64 body did not decode.
    #[error("invalid base64 body: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Decoded image is empty.
    #[error("image body is empty")]
    Empty,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
