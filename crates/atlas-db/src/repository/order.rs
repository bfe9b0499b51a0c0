//! # Order Repository
//!
//! Reads and writes committed orders and their lines.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. COMMIT (Checkout::commit, one transaction)                         │
//! │     └── insert_in()      → orders row { status: completed }           │
//! │     └── insert_line_in() → one order_lines row per cart line          │
//! │                                                                         │
//! │  2. (OPTIONAL) VOID (Checkout::void)                                   │
//! │     └── mark_voided_in() → { status: voided, voided_at }              │
//! │                                                                         │
//! │  Nothing else ever changes an order row.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use atlas_core::pricing::{PriceBreakdown, PricedLine, Settlement};
use atlas_core::{Order, OrderLine, OrderReceipt, PaymentMethod};

use crate::error::{DbError, DbResult};

const ORDER_SELECT: &str = r#"
    SELECT
        o.id,
        o.code,
        o.subtotal,
        o.discount_amount,
        o.service_charge_bps,
        o.service_charge_amount,
        o.tax_bps,
        o.tax_amount,
        o.total_amount,
        o.payment_method,
        o.payment_amount,
        o.change_amount,
        o.payment_proof,
        o.status,
        o.notes,
        o.created_by,
        u.full_name AS created_by_name,
        o.created_at,
        o.voided_at
    FROM orders o
    LEFT JOIN users u ON u.id = o.created_by
"#;

/// Everything needed to write an order header.
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub code: &'a str,
    pub breakdown: &'a PriceBreakdown,
    pub settlement: &'a Settlement,
    pub payment_method: PaymentMethod,
    pub payment_proof: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order with its lines.
    pub async fn get(&self, id: i64) -> DbResult<Option<OrderReceipt>> {
        let mut conn = self.pool.acquire().await?;
        Self::receipt_in(&mut conn, id).await
    }

    /// Gets an order by its code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE o.code = ?1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn find_in(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE o.id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(order)
    }

    /// Lines of an order in insertion (cart) order.
    pub async fn lines_in(conn: &mut SqliteConnection, order_id: i64) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, product_id, product_name, quantity,
                   unit_price, discount_bps, line_subtotal, notes
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(lines)
    }

    pub async fn receipt_in(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<OrderReceipt>> {
        let Some(order) = Self::find_in(conn, id).await? else {
            return Ok(None);
        };
        let items = Self::lines_in(conn, id).await?;

        Ok(Some(OrderReceipt { order, items }))
    }

    /// Writes the order header and returns its id.
    pub async fn insert_in(conn: &mut SqliteConnection, order: &NewOrder<'_>) -> DbResult<i64> {
        debug!(code = %order.code, total = %order.breakdown.total, "Inserting order");

        let breakdown = order.breakdown;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (
                code, subtotal, discount_amount,
                service_charge_bps, service_charge_amount, tax_bps, tax_amount,
                total_amount, payment_method, payment_amount, change_amount,
                payment_proof, status, notes, created_by, created_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, 'completed', ?13, ?14, ?15
            )
            RETURNING id
            "#,
        )
        .bind(order.code)
        .bind(breakdown.subtotal.minor())
        .bind(breakdown.discount.minor())
        .bind(breakdown.charges.service_charge_rate.bps())
        .bind(breakdown.service_charge.minor())
        .bind(breakdown.charges.tax_rate.bps())
        .bind(breakdown.tax.minor())
        .bind(breakdown.total.minor())
        .bind(order.payment_method)
        .bind(order.settlement.payment.minor())
        .bind(order.settlement.change.minor())
        .bind(order.payment_proof)
        .bind(order.notes)
        .bind(order.created_by)
        .bind(order.created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }

    /// Writes one line, snapshotting name, price and discount.
    pub async fn insert_line_in(conn: &mut SqliteConnection, order_id: i64, line: &PricedLine) -> DbResult<()> {
        debug!(order_id, product_id = line.product_id, quantity = line.quantity, "Inserting order line");

        let line_subtotal = line.subtotal().map_err(|e| DbError::CheckViolation {
            message: e.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO order_lines (
                order_id, product_id, product_name, quantity,
                unit_price, discount_bps, line_subtotal, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.unit_price.minor())
        .bind(line.discount_rate.bps())
        .bind(line_subtotal.minor())
        .bind(&line.notes)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Flips a completed order to voided. Returns `false` when the order
    /// is not in `completed` state.
    pub async fn mark_voided_in(conn: &mut SqliteConnection, id: i64, at: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'voided', voided_at = ?2 WHERE id = ?1 AND status = 'completed'",
        )
        .bind(id)
        .bind(at)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Number of orders (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use atlas_core::pricing::{price_cart, Charges};
    use atlas_core::{Money, OrderStatus, Percentage};

    #[tokio::test]
    async fn test_insert_and_read_receipt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let line = PricedLine::new(7, "Whey Protein", Money::from_minor(50_000), Percentage::from_bps(1_000), 2)
            .with_notes(Some("no scoop".to_string()));
        let charges = Charges::new(Percentage::from_bps(500), Percentage::from_bps(1_000));
        let breakdown = price_cart(std::slice::from_ref(&line), Money::zero(), charges).unwrap();
        let settlement = breakdown.settle(Money::from_minor(110_000)).unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let id = OrderRepository::insert_in(
            &mut conn,
            &NewOrder {
                code: "TRX2026100001",
                breakdown: &breakdown,
                settlement: &settlement,
                payment_method: PaymentMethod::Cash,
                payment_proof: None,
                notes: None,
                created_by: 1,
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();
        OrderRepository::insert_line_in(&mut conn, id, &line).await.unwrap();
        drop(conn);

        let receipt = db.orders().get(id).await.unwrap().unwrap();
        assert_eq!(receipt.order.code, "TRX2026100001");
        assert_eq!(receipt.order.total_amount, 103_950);
        assert_eq!(receipt.order.change_amount, 6_050);
        assert_eq!(receipt.order.tax_bps, 1_000);
        assert_eq!(receipt.order.status, OrderStatus::Completed);
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].line_subtotal, 90_000);
        assert_eq!(receipt.items[0].notes.as_deref(), Some("no scoop"));

        let by_code = db.orders().get_by_code("TRX2026100001").await.unwrap().unwrap();
        assert_eq!(by_code.id, id);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.orders().get(1).await.unwrap().is_none());
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }
}
