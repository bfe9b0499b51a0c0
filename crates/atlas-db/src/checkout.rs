//! # Order Commit Coordinator
//!
//! Turns a cart into a committed order in one all-or-nothing transaction.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutRequest                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate()                   shape only, no I/O      → ValidationError │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  artifacts::materialize       proof file (failure → no proof)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE ─────────────────────────────────────────────────┐    │
//! │  │  InventoryGuard::admit      re-read product, reserve quantity  │    │
//! │  │  SettingsRepository         service charge + tax rates         │    │
//! │  │  price_cart / settle        InvalidAmount on short payment     │    │
//! │  │  SequenceRepository         TRX<YYYY><MM><NNNN>                │    │
//! │  │  OrderRepository            order row + line rows              │    │
//! │  │  InventoryGuard::decrement  stock - qty WHERE stock >= qty     │    │
//! │  COMMIT ──────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderReceipt (re-read inside the transaction)                         │
//! │                                                                         │
//! │  Any `?` between BEGIN and COMMIT drops the transaction: rollback.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info, warn};

use atlas_core::pricing::{price_cart, PricedLine};
use atlas_core::sequence::Period;
use atlas_core::validation::{
    validate_cart_size, validate_discount_amount, validate_notes, validate_payment_amount, validate_quantity,
};
use atlas_core::{CoreError, Money, OrderReceipt, OrderStatus, PaymentMethod, Product, ValidationError};

use crate::artifacts::{self, ProofStore};
use crate::error::DbError;
use crate::repository::order::{NewOrder, OrderRepository};
use crate::repository::product::ProductRepository;
use crate::repository::sequence::SequenceRepository;
use crate::repository::settings::SettingsRepository;

/// Takes the write lock up front so two commits never interleave their
/// stock reads and writes.
const BEGIN_IMMEDIATE: &str = "BEGIN IMMEDIATE";

// =============================================================================
// Request
// =============================================================================

/// One product/quantity entry of a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
    pub notes: Option<String>,
}

impl CartLine {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        CartLine {
            product_id,
            quantity,
            notes: None,
        }
    }
}

/// Everything a till sends to finalize a sale.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub payment_amount: Money,
    pub discount_amount: Money,
    /// Stored reference or `data:image/...;base64,...` payload.
    pub payment_proof: Option<String>,
    pub notes: Option<String>,
    pub operator_id: i64,
}

impl CheckoutRequest {
    /// Checks everything that can be checked without the database and
    /// normalizes notes.
    fn validate(&mut self) -> Result<(), ValidationError> {
        validate_cart_size(self.items.len())?;
        for line in &mut self.items {
            validate_quantity(line.quantity)?;
            line.notes = validate_notes(line.notes.as_deref())?;
        }
        validate_payment_amount(self.payment_amount)?;
        validate_discount_amount(self.discount_amount)?;
        self.notes = validate_notes(self.notes.as_deref())?;
        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a commit or void did not happen. Nothing was persisted.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Db(DbError::from(err))
    }
}

// =============================================================================
// Inventory Guard
// =============================================================================

/// Stock checks for one commit.
///
/// Remembers how much of each product earlier lines of the same cart
/// already claimed, so `[whey x3, whey x3]` against stock 5 fails.
#[derive(Debug, Default)]
pub struct InventoryGuard {
    reserved: HashMap<i64, i64>,
}

impl InventoryGuard {
    pub fn new() -> Self {
        InventoryGuard::default()
    }

    /// Claims `quantity` of `product` on top of earlier claims.
    pub fn reserve(&mut self, product: &Product, quantity: i64) -> Result<(), CoreError> {
        if !product.is_active() {
            return Err(CoreError::ProductNotFound(product.id));
        }

        let claimed = self.reserved.get(&product.id).copied().unwrap_or(0);
        let requested = claimed + quantity;
        if product.stock < requested {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested,
            });
        }

        self.reserved.insert(product.id, requested);
        Ok(())
    }

    /// Re-reads the product inside the transaction, reserves the quantity
    /// and prices the line at the product's current price and discount.
    pub async fn admit(&mut self, conn: &mut SqliteConnection, line: &CartLine) -> Result<PricedLine, CheckoutError> {
        let product = ProductRepository::find_in(conn, line.product_id)
            .await?
            .ok_or(CoreError::ProductNotFound(line.product_id))?;

        self.reserve(&product, line.quantity)?;

        Ok(PricedLine::new(
            product.id,
            product.name.clone(),
            product.price(),
            product.discount_rate(),
            line.quantity,
        )
        .with_notes(line.notes.clone()))
    }

    /// Applies the conditional decrement for one line.
    ///
    /// Fails with `InsufficientStock` if the row no longer has enough
    /// stock at write time.
    pub async fn decrement(conn: &mut SqliteConnection, line: &PricedLine) -> Result<(), CheckoutError> {
        if ProductRepository::decrement_stock_in(conn, line.product_id, line.quantity).await? {
            return Ok(());
        }

        let available = ProductRepository::find_in(conn, line.product_id)
            .await?
            .map_or(0, |p| p.stock);
        Err(CoreError::InsufficientStock {
            product: line.product_name.clone(),
            available,
            requested: line.quantity,
        }
        .into())
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Commits and voids orders.
#[derive(Clone)]
pub struct Checkout {
    pool: SqlitePool,
    proofs: Arc<dyn ProofStore>,
}

impl Checkout {
    pub fn new(pool: SqlitePool, proofs: Arc<dyn ProofStore>) -> Self {
        Checkout { pool, proofs }
    }

    /// Prices, stock-checks and persists an order.
    ///
    /// ## Errors
    /// * `Validation` - malformed request, nothing touched
    /// * `ProductNotFound` / `InsufficientStock` / `InvalidAmount` - rolled back
    /// * `Db` - store failure, rolled back
    ///
    /// The payment proof is decoded and written before the write lock is
    /// taken. A malformed or unwritable proof does not fail the order; it
    /// is logged and the order is stored without one. A commit that then
    /// fails leaves the proof file behind.
    pub async fn commit(&self, mut request: CheckoutRequest) -> Result<OrderReceipt, CheckoutError> {
        request.validate()?;

        debug!(
            lines = request.items.len(),
            operator = request.operator_id,
            method = request.payment_method.as_str(),
            "Starting checkout"
        );

        let payment_proof = match request.payment_proof.as_deref() {
            None => None,
            Some(raw) => match artifacts::materialize(Arc::clone(&self.proofs), raw).await {
                Ok(reference) => reference,
                Err(e) => {
                    warn!(error = %e, "Payment proof discarded");
                    None
                }
            },
        };

        let mut tx = self.pool.begin_with(BEGIN_IMMEDIATE).await?;

        let mut guard = InventoryGuard::new();
        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            lines.push(guard.admit(&mut tx, item).await?);
        }

        let charges = SettingsRepository::charges_in(&mut tx).await?;
        let breakdown = price_cart(&lines, request.discount_amount, charges)?;
        let settlement = breakdown.settle(request.payment_amount)?;

        let period = Period::of(&chrono::Local::now().date_naive());
        let code = SequenceRepository::next_in(&mut tx, period).await?;

        let order_id = OrderRepository::insert_in(
            &mut tx,
            &NewOrder {
                code: &code,
                breakdown: &breakdown,
                settlement: &settlement,
                payment_method: request.payment_method,
                payment_proof: payment_proof.as_deref(),
                notes: request.notes.as_deref(),
                created_by: request.operator_id,
                created_at: Utc::now(),
            },
        )
        .await?;

        for line in &lines {
            OrderRepository::insert_line_in(&mut tx, order_id, line).await?;
            InventoryGuard::decrement(&mut tx, line).await?;
        }

        let receipt = OrderRepository::receipt_in(&mut tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        tx.commit().await?;

        info!(
            code = %receipt.order.code,
            total = receipt.order.total_amount,
            lines = receipt.items.len(),
            "Order committed"
        );
        Ok(receipt)
    }

    /// Voids a completed order and puts its stock back.
    ///
    /// ## Errors
    /// * `Db(NotFound)` - no such order
    /// * `InvalidOrderStatus` - already voided
    pub async fn void(&self, order_id: i64) -> Result<OrderReceipt, CheckoutError> {
        let mut tx = self.pool.begin_with(BEGIN_IMMEDIATE).await?;

        let order = OrderRepository::find_in(&mut tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        if order.status != OrderStatus::Completed
            || !OrderRepository::mark_voided_in(&mut tx, order_id, Utc::now()).await?
        {
            return Err(CoreError::InvalidOrderStatus {
                code: order.code,
                status: order.status.to_string(),
            }
            .into());
        }

        for line in OrderRepository::lines_in(&mut tx, order_id).await? {
            ProductRepository::restock_in(&mut tx, line.product_id, line.quantity).await?;
        }

        let receipt = OrderRepository::receipt_in(&mut tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        tx.commit().await?;

        info!(code = %receipt.order.code, "Order voided");
        Ok(receipt)
    }
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout").finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
