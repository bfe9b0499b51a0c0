//! # Category Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use atlas_core::validation::{validate_category_name, validate_notes};
use atlas_core::Category;

use crate::archive::{ArchivalPolicy, ArchiveOutcome};
use crate::error::{DbError, DbResult};
use crate::repository::product::CatalogError;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Active categories ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, status, created_at
            FROM product_categories
            WHERE status = 'active'
            ORDER BY name COLLATE NOCASE, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn insert(&self, name: &str, description: Option<&str>) -> Result<Category, CatalogError> {
        let name = validate_category_name(name)?;
        let description = validate_notes(description)?;
        debug!(name = %name, "Inserting category");

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO product_categories (name, description, status, created_at)
            VALUES (?1, ?2, 'active', ?3)
            RETURNING id, name, description, status, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(category)
    }

    /// Deletes the category, or deactivates it while products still use it.
    pub async fn archive(&self, id: i64) -> DbResult<ArchiveOutcome> {
        let mut tx = self.pool.begin().await?;
        let outcome = ArchivalPolicy::CATEGORY.archive(&mut tx, id).await?;
        tx.commit().await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_archive_policy_for_categories() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let empty = repo.insert("Apparel", None).await.unwrap();
        let used = repo.insert("Drinks", Some("Cold drinks")).await.unwrap();
        db.products()
            .insert(NewProduct {
                category_id: Some(used.id),
                name: "Isotonic".to_string(),
                description: None,
                price: 8_000,
                discount_bps: 0,
                stock: 24,
                image: None,
            })
            .await
            .unwrap();

        assert_eq!(repo.archive(empty.id).await.unwrap(), ArchiveOutcome::Deleted);
        assert_eq!(repo.archive(used.id).await.unwrap(), ArchiveOutcome::Deactivated);

        assert!(repo.list_active().await.unwrap().is_empty());
    }
}
