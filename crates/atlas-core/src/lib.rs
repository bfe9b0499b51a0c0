//! # atlas-core: Pure Business Logic for the Atlas POS
//!
//! Everything the order settlement engine decides without touching a
//! database, a clock or a file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atlas POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pos-api (axum)                               │   │
//! │  │    createOrder, holdCart, recallCart, getCatalog, ...           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    atlas-db                                     │   │
//! │  │    Checkout (BEGIN IMMEDIATE), repositories, proof store        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ atlas-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌───────┐ ┌──────────┐  │   │
//! │  │   │  money  │ │ pricing │ │ sequence │ │ proof │ │validation│  │   │
//! │  │   │  Money  │ │ Charges │ │OrderCode │ │base64 │ │  rules   │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └───────┘ └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, ParkedCart, ...)
//! - [`money`] - Money and Percentage with integer arithmetic
//! - [`pricing`] - Cart pricing: subtotal, service charge, tax, change
//! - [`sequence`] - `TRX<YYYY><MM><NNNN>` order codes
//! - [`proof`] - Payment proof payload parsing
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use atlas_core::money::{Money, Percentage};
//! use atlas_core::pricing::{price_cart, Charges, PricedLine};
//!
//! let line = PricedLine::new(7, "Whey Protein", Money::from_minor(50_000), Percentage::from_bps(1_000), 2);
//! let charges = Charges::new(Percentage::from_bps(500), Percentage::from_bps(1_000));
//!
//! let breakdown = price_cart(&[line], Money::zero(), charges).unwrap();
//! assert_eq!(breakdown.subtotal.minor(), 90_000);
//! assert_eq!(breakdown.total.minor(), 103_950);
//! ```

pub mod error;
pub mod money;
pub mod pricing;
pub mod proof;
pub mod sequence;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ProofError, ValidationError};
pub use money::{Money, Percentage};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single order.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Catches typos such as 1000 instead of 10 at the till.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Prefix of every order code.
pub const ORDER_CODE_PREFIX: &str = "TRX";

/// Setting key holding the service charge percentage.
pub const SERVICE_CHARGE_SETTING: &str = "service_charge_percent";

/// Setting key holding the tax percentage.
pub const TAX_SETTING: &str = "tax_percent";

/// Role name that may void orders and edit master data.
pub const ADMIN_ROLE: &str = "Admin";
