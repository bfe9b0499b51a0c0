//! # Archival Policy
//!
//! Master data that history still points at cannot be deleted outright.
//!
//! ```text
//! archive(id)
//!    │
//!    ├── row missing ───────────────────────► NotFound
//!    │
//!    ├── any dependent row references it ───► UPDATE .. SET status = 'inactive'
//!    │                                         (ArchiveOutcome::Deactivated)
//!    │
//!    └── unreferenced ──────────────────────► DELETE
//!                                              (ArchiveOutcome::Deleted)
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// What archiving did to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveOutcome {
    Deleted,
    Deactivated,
}

/// A table/column pair that references the archived entity.
#[derive(Debug, Clone, Copy)]
pub struct Dependent {
    pub table: &'static str,
    pub column: &'static str,
}

/// Delete-if-unreferenced, else deactivate.
#[derive(Debug, Clone, Copy)]
pub struct ArchivalPolicy {
    pub entity: &'static str,
    pub table: &'static str,
    pub dependents: &'static [Dependent],
    /// Column stamped on deactivation, if the table has one.
    pub touch_column: Option<&'static str>,
}

impl ArchivalPolicy {
    /// Products referenced by order lines keep their row.
    pub const PRODUCT: ArchivalPolicy = ArchivalPolicy {
        entity: "Product",
        table: "products",
        dependents: &[Dependent {
            table: "order_lines",
            column: "product_id",
        }],
        touch_column: Some("updated_at"),
    };

    /// Categories still holding products keep their row.
    pub const CATEGORY: ArchivalPolicy = ArchivalPolicy {
        entity: "Category",
        table: "product_categories",
        dependents: &[Dependent {
            table: "products",
            column: "category_id",
        }],
        touch_column: None,
    };

    /// Runs the policy for one row. Call inside a transaction so the
    /// reference check and the mutation see the same snapshot.
    pub async fn archive(&self, conn: &mut SqliteConnection, id: i64) -> DbResult<ArchiveOutcome> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)",
            self.table
        ))
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        if !exists {
            return Err(DbError::not_found(self.entity, id));
        }

        let mut referenced = false;
        for dep in self.dependents {
            let found: bool = sqlx::query_scalar(&format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)",
                dep.table, dep.column
            ))
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
            if found {
                referenced = true;
                break;
            }
        }

        if referenced {
            let sql = match self.touch_column {
                Some(column) => format!(
                    "UPDATE {} SET status = 'inactive', {column} = ?2 WHERE id = ?1",
                    self.table
                ),
                None => format!("UPDATE {} SET status = 'inactive' WHERE id = ?1", self.table),
            };
            let mut query = sqlx::query(&sql).bind(id);
            if self.touch_column.is_some() {
                query = query.bind(Utc::now());
            }
            query.execute(&mut *conn).await?;

            debug!(entity = self.entity, id, "Deactivated referenced record");
            Ok(ArchiveOutcome::Deactivated)
        } else {
            sqlx::query(&format!("DELETE FROM {} WHERE id = ?1", self.table))
                .bind(id)
                .execute(&mut *conn)
                .await?;

            debug!(entity = self.entity, id, "Deleted unreferenced record");
            Ok(ArchiveOutcome::Deleted)
        }
    }
}
