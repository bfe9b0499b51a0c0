//! # Validation Module
//!
//! Input checks that run before anything touches the store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (pos-api)                                    │
//! │  └── JSON shape and types (serde)                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rule validation (quantities, labels, amounts)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (quantity > 0)                          │
//! │  └── UNIQUE (orders.code)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Text validators return the trimmed value so callers store what was
//! checked.

use crate::error::ValidationError;
use crate::money::{Money, Percentage};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, SERVICE_CHARGE_SETTING, TAX_SETTING};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest parked cart label.
pub const MAX_LABEL_LEN: usize = 100;

/// Longest order or line note.
pub const MAX_NOTES_LEN: usize = 500;

/// Longest catalog search term.
pub const MAX_SEARCH_LEN: usize = 100;

/// Longest product or category name.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Validates a parked cart label.
///
/// ```rust
/// use atlas_core::validation::validate_label;
///
/// assert_eq!(validate_label("  Table 4 ").unwrap(), "Table 4");
/// assert!(validate_label("   ").is_err());
/// ```
pub fn validate_label(label: &str) -> ValidationResult<String> {
    required_text("label", label, MAX_LABEL_LEN)
}

/// Validates free-text notes. Blank notes become `None`.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    optional_text("notes", notes, MAX_NOTES_LEN)
}

/// Validates a catalog search term. Blank means "no filter".
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    optional_text("search", query, MAX_SEARCH_LEN)
}

pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, MAX_NAME_LEN)
}

pub fn validate_category_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, MAX_NAME_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the tendered amount. Zero or negative payments are refused
/// before pricing runs.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "paymentAmount".to_string(),
        });
    }

    Ok(())
}

/// Validates an order-level discount. Only the sign is checked here; the
/// upper bound (subtotal) is known after pricing.
pub fn validate_discount_amount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discountAmount".to_string(),
        });
    }

    Ok(())
}

pub fn validate_price(price: i64) -> ValidationResult<()> {
    if price < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Product discounts are capped at 100%.
pub fn validate_discount_rate(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "discountBps".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in an order.
///
/// ## Rules
/// - At least one line
/// - At most MAX_CART_ITEMS (100)
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_CART_ITEMS,
        });
    }

    Ok(())
}

/// A parked cart payload must be a JSON object or array; its contents are
/// not inspected.
pub fn validate_cart_payload(raw: &str) -> ValidationResult<()> {
    match raw.trim_start().as_bytes().first() {
        None => Err(ValidationError::Required {
            field: "payload".to_string(),
        }),
        Some(b'{') | Some(b'[') => Ok(()),
        Some(_) => Err(ValidationError::InvalidFormat {
            field: "payload".to_string(),
            reason: "expected a JSON object or array".to_string(),
        }),
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Validates a setting update and returns the value to store.
///
/// Charge rates must be non-negative decimals and are stored in their
/// shortest form (`"5.50"` → `"5.5"`); other keys take any short text.
pub fn validate_setting(key: &str, value: &str) -> ValidationResult<(String, String)> {
    let key = required_text("settingKey", key, 100)?;

    if key == SERVICE_CHARGE_SETTING || key == TAX_SETTING {
        let rate: Percentage = value.parse().map_err(|_| ValidationError::InvalidFormat {
            field: key.clone(),
            reason: "expected a non-negative percentage".to_string(),
        })?;
        return Ok((key, rate.to_string()));
    }

    let value = value.trim();
    if value.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: key,
            max: MAX_NOTES_LEN,
        });
    }
    Ok((key, value.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
