//! # Domain Types
//!
//! Core domain types of the order settlement engine.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  price          │   │  code TRX...    │   │  product_name   │       │
//! │  │  discount_bps   │   │  totals         │   │   (snapshot)    │       │
//! │  │  stock >= 0     │   │  status         │   │  line_subtotal  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ParkedCart    │   │  PaymentMethod  │   │    Operator     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  label          │   │  cash/transfer  │   │  id, role       │       │
//! │  │  payload (raw)  │   │  qris/card      │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row structs keep money as plain `i64` minor units and rates as `u32`
//! basis points so they map straight onto SQLite columns; accessor methods
//! hand out [`Money`] and [`Percentage`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Percentage};
use crate::ADMIN_ROLE;

// =============================================================================
// Record Status
// =============================================================================

/// Lifecycle flag shared by master data (products, categories).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub category_id: Option<i64>,
    /// Joined from `product_categories` on read.
    pub category_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor units.
    pub price: i64,
    /// Per-unit discount in basis points.
    pub discount_bps: u32,
    pub stock: i64,
    pub image: Option<String>,
    pub status: RecordStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price)
    }

    #[inline]
    pub fn discount_rate(&self) -> Percentage {
        Percentage::from_bps(self.discount_bps)
    }

    /// Unit price after the product's own discount.
    pub fn final_price(&self) -> Money {
        self.price().apply_percentage_discount(self.discount_rate())
    }

    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: RecordStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a committed order.
///
/// Orders are created `Completed`; `Voided` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Completed,
    Voided,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Voided => write!(f, "voided"),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    /// Bank transfer; usually comes with a proof image.
    Transfer,
    /// QR payment (QRIS).
    Qris,
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Transfer,
        PaymentMethod::Qris,
        PaymentMethod::Card,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Qris => "qris",
            PaymentMethod::Card => "card",
        }
    }
}

/// Case-insensitive: tills send `"Cash"`, `"QRIS"`, `"transfer"`.
impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A finalized, priced, inventory-adjusted transaction.
///
/// Immutable once created except for `status` / `voided_at`.
///
/// ## Invariants
/// - `total_amount = subtotal - discount_amount + service_charge_amount + tax_amount`
/// - `change_amount = payment_amount - total_amount >= 0`
/// - `0 <= discount_amount <= subtotal`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// `TRX<YYYY><MM><NNNN>`, unique.
    pub code: String,
    pub subtotal: i64,
    pub discount_amount: i64,
    pub service_charge_bps: u32,
    pub service_charge_amount: i64,
    pub tax_bps: u32,
    pub tax_amount: i64,
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_amount: i64,
    pub change_amount: i64,
    pub payment_proof: Option<String>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_by: i64,
    /// Joined from `users` on read.
    pub created_by_name: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub voided_at: Option<DateTime<Utc>>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_amount)
    }

    #[inline]
    pub fn service_charge_rate(&self) -> Percentage {
        Percentage::from_bps(self.service_charge_bps)
    }

    #[inline]
    pub fn tax_rate(&self) -> Percentage {
        Percentage::from_bps(self.tax_bps)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// One product/quantity entry of an order.
///
/// Snapshot pattern: name, unit price and discount are frozen at commit
/// time and immune to later catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    /// Lookup only; the product may since have been archived.
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub discount_bps: u32,
    /// `(unit_price - unit_price * discount) * quantity`
    pub line_subtotal: i64,
    pub notes: Option<String>,
}

impl OrderLine {
    #[inline]
    pub fn line_subtotal(&self) -> Money {
        Money::from_minor(self.line_subtotal)
    }
}

/// An order together with its lines, as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderReceipt {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLine>,
}

// =============================================================================
// Parked Cart
// =============================================================================

/// An unfinished cart saved under a label for later resumption.
///
/// `payload` is opaque: stored and returned byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParkedCart {
    pub id: i64,
    pub label: String,
    #[ts(type = "unknown")]
    pub payload: Box<RawValue>,
    pub created_by: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Listing entry for a parked cart (payload omitted).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParkedCartSummary {
    pub id: i64,
    pub label: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub created_by: i64,
    pub created_by_name: Option<String>,
}

// =============================================================================
// Setting
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub setting_key: String,
    pub setting_value: String,
    pub description: Option<String>,
}

// =============================================================================
// Operator
// =============================================================================

/// The authenticated staff member performing a request.
///
/// Supplied by the upstream gateway; never verified here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub id: i64,
    pub role: String,
}

impl Operator {
    pub fn new(id: i64, role: impl Into<String>) -> Self {
        Operator {
            id,
            role: role.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case(ADMIN_ROLE)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
