//! # Parked Cart Repository
//!
//! Saves unfinished carts under a label and hands each one back exactly
//! once.
//!
//! ```text
//! hold(label, payload) ──► parked_carts row
//! list()               ──► summaries, newest first (no payload)
//! recall(id)           ──► DELETE .. RETURNING   (row gone, payload returned)
//! recall(id) again     ──► NotFound
//! ```
//!
//! The payload is stored as the exact JSON text received and never parsed
//! beyond checking it is an object or array.

use chrono::{DateTime, Utc};
use serde_json::value::RawValue;
use sqlx::SqlitePool;
use tracing::debug;

use atlas_core::validation::{validate_cart_payload, validate_label};
use atlas_core::{ParkedCart, ParkedCartSummary};

use crate::error::{DbError, DbResult};
use crate::repository::product::CatalogError;

const SUMMARY_SELECT: &str = r#"
    SELECT
        c.id,
        c.label,
        c.created_at,
        c.created_by,
        u.full_name AS created_by_name
    FROM parked_carts c
    LEFT JOIN users u ON u.id = c.created_by
"#;

#[derive(sqlx::FromRow)]
struct ParkedCartRow {
    id: i64,
    label: String,
    payload: String,
    created_by: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ParkedCartRow> for ParkedCart {
    type Error = DbError;

    fn try_from(row: ParkedCartRow) -> Result<Self, Self::Error> {
        let payload = RawValue::from_string(row.payload)
            .map_err(|e| DbError::Internal(format!("stored cart payload is not JSON: {e}")))?;

        Ok(ParkedCart {
            id: row.id,
            label: row.label,
            payload,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

/// Repository for parked carts.
#[derive(Debug, Clone)]
pub struct ParkedCartRepository {
    pool: SqlitePool,
}

impl ParkedCartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ParkedCartRepository { pool }
    }

    /// Parks a cart.
    ///
    /// ## Errors
    /// * `Validation` - blank or over-long label, payload not an object/array
    pub async fn hold(&self, label: &str, payload: &RawValue, created_by: i64) -> Result<ParkedCartSummary, CatalogError> {
        let label = validate_label(label)?;
        validate_cart_payload(payload.get())?;

        debug!(label = %label, created_by, bytes = payload.get().len(), "Parking cart");

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO parked_carts (label, payload, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(&label)
        .bind(payload.get())
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        let summary = sqlx::query_as::<_, ParkedCartSummary>(&format!("{SUMMARY_SELECT} WHERE c.id = ?1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(summary)
    }

    /// All parked carts, newest first.
    pub async fn list(&self) -> DbResult<Vec<ParkedCartSummary>> {
        let carts = sqlx::query_as::<_, ParkedCartSummary>(&format!(
            "{SUMMARY_SELECT} ORDER BY c.created_at DESC, c.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(carts)
    }

    /// Removes a parked cart and returns it.
    ///
    /// Read and delete are one statement, so two tills recalling the same
    /// cart cannot both get it.
    ///
    /// ## Returns
    /// * `Ok(ParkedCart)` - the cart, payload byte for byte as held
    /// * `Err(NotFound)` - never held, or already recalled
    pub async fn recall(&self, id: i64) -> DbResult<ParkedCart> {
        let row = sqlx::query_as::<_, ParkedCartRow>(
            r#"
            DELETE FROM parked_carts
            WHERE id = ?1
            RETURNING id, label, payload, created_by, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Parked cart", id))?;

        debug!(id, label = %row.label, "Recalled parked cart");
        ParkedCart::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use atlas_core::ValidationError;

    fn raw(json: &str) -> Box<RawValue> {
        RawValue::from_string(json.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_hold_and_recall_returns_payload_verbatim() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.parked_carts();

        let payload = r#"{ "items" : [ {"productId":7, "qty":2, "note":"  extra  "} ], "z":1.50 }"#;
        let held = repo.hold(" Locker 12 ", &raw(payload), 3).await.unwrap();
        assert_eq!(held.label, "Locker 12");
        assert_eq!(held.created_by, 3);

        let recalled = repo.recall(held.id).await.unwrap();
        assert_eq!(recalled.payload.get(), payload);
        assert_eq!(recalled.label, "Locker 12");

        let err = repo.recall(held.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_operator_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO users (id, username, full_name, role) VALUES (5, 'rina', 'Rina Putri', 'Staff')")
            .execute(db.pool())
            .await
            .unwrap();

        let repo = db.parked_carts();
        let first = repo.hold("Table 1", &raw("[]"), 5).await.unwrap();
        let second = repo.hold("Table 2", &raw("{}"), 5).await.unwrap();

        let carts = repo.list().await.unwrap();
        let ids: Vec<_> = carts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(carts[0].created_by_name.as_deref(), Some("Rina Putri"));
    }

    #[tokio::test]
    async fn test_hold_rejects_bad_input() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.parked_carts();

        let err = repo.hold("  ", &raw("{}"), 1).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ValidationError::Required { .. })));

        let err = repo.hold("Table 9", &raw("42"), 1).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ValidationError::InvalidFormat { .. })));
    }
}
