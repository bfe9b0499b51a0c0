//! # Order Sequence Repository
//!
//! Allocates order codes `TRX<YYYY><MM><NNNN>` from a per-period counter.
//!
//! ## Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  next_in(conn, 2026-10)          (inside the checkout transaction)     │
//! │                                                                         │
//! │  1. floor = highest existing TRX202610% code + 1   (or 1 if none)      │
//! │                                                                         │
//! │  2. INSERT INTO order_sequences (period, last_value)                   │
//! │     VALUES ('202610', floor)                                           │
//! │     ON CONFLICT(period) DO UPDATE                                      │
//! │       SET last_value = MAX(last_value + 1, floor)                      │
//! │     RETURNING last_value                                               │
//! │                                                                         │
//! │  3. TRX202610 + {:04}                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller holds the write lock (`BEGIN IMMEDIATE`), so no two commits
//! read the counter concurrently; a rolled-back commit also rolls back its
//! increment. The floor keeps the counter ahead of codes written by other
//! means (imports, restored backups). The `UNIQUE` index on `orders.code`
//! is the last line of defense.

use sqlx::SqliteConnection;
use tracing::debug;

use atlas_core::sequence::Period;

use crate::error::{DbError, DbResult};

pub struct SequenceRepository;

impl SequenceRepository {
    /// Reserves the next code of `period`.
    pub async fn next_in(conn: &mut SqliteConnection, period: Period) -> DbResult<String> {
        let floor = Self::highest_existing_in(conn, period).await?.map_or(1, |seq| seq + 1);

        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO order_sequences (period, last_value)
            VALUES (?1, ?2)
            ON CONFLICT(period) DO UPDATE SET
                last_value = MAX(order_sequences.last_value + 1, excluded.last_value)
            RETURNING last_value
            "#,
        )
        .bind(period.key())
        .bind(i64::from(floor))
        .fetch_one(&mut *conn)
        .await?;

        let seq = u32::try_from(value)
            .map_err(|_| DbError::Internal(format!("order sequence out of range: {value}")))?;

        let code = period.format_code(seq);
        debug!(period = %period, code = %code, "Allocated order code");
        Ok(code)
    }

    /// Highest sequence number among stored codes of `period`.
    ///
    /// Codes past 9999 are one digit longer, so ordering by length first
    /// keeps `...10000` above `...9999`.
    async fn highest_existing_in(conn: &mut SqliteConnection, period: Period) -> DbResult<Option<u32>> {
        let code: Option<String> = sqlx::query_scalar(
            r#"
            SELECT code FROM orders
            WHERE code LIKE ?1
            ORDER BY length(code) DESC, code DESC
            LIMIT 1
            "#,
        )
        .bind(format!("{}%", period.code_prefix()))
        .fetch_optional(&mut *conn)
        .await?;

        Ok(code.and_then(|code| period.parse_sequence(&code)))
    }
}
