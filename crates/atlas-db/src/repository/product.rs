//! # Product Repository
//!
//! Catalog reads, master-data writes, and the stock mutations used inside
//! the checkout transaction.
//!
//! ## Stock Mutations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ read stock, compute, write back  (two commits can both pass)       │
//! │                                                                         │
//! │  ✅ conditional decrement                                              │
//! │     UPDATE products SET stock = stock - 2 WHERE id = 7 AND stock >= 2  │
//! │     rows_affected == 0  →  not enough stock at write time              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use atlas_core::validation::{
    validate_discount_rate, validate_notes, validate_price, validate_product_name, validate_search_query,
    validate_stock,
};
use atlas_core::{Product, RecordStatus, ValidationError};

use crate::archive::{ArchivalPolicy, ArchiveOutcome};
use crate::error::{DbError, DbResult};
use crate::update::{FieldValue, UpdateBuilder};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id,
        p.category_id,
        c.name AS category_name,
        p.name,
        p.description,
        p.price,
        p.discount_bps,
        p.stock,
        p.image,
        p.status,
        p.created_at,
        p.updated_at
    FROM products p
    LEFT JOIN product_categories c ON c.id = p.category_id
"#;

// =============================================================================
// Input DTOs
// =============================================================================

/// Fields for a new product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub category_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub discount_bps: u32,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewProduct {
    fn validated(mut self) -> Result<Self, ValidationError> {
        self.name = validate_product_name(&self.name)?;
        self.description = validate_notes(self.description.as_deref())?;
        validate_price(self.price)?;
        validate_discount_rate(self.discount_bps)?;
        validate_stock(self.stock)?;
        Ok(self)
    }
}

/// Optional product fields; absent fields are left unchanged.
///
/// An empty `description` or `image` clears the column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub discount_bps: Option<u32>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    pub status: Option<RecordStatus>,
}

impl ProductPatch {
    /// Validates the present fields and lists them as assignments, in
    /// column order.
    pub fn assignments(&self) -> Result<UpdateBuilder, ValidationError> {
        let mut builder = UpdateBuilder::new();

        builder.set_some("category_id", self.category_id, FieldValue::Int);

        if let Some(name) = &self.name {
            builder.set("name", FieldValue::Text(validate_product_name(name)?));
        }
        if let Some(description) = &self.description {
            builder.set("description", FieldValue::OptText(validate_notes(Some(description))?));
        }
        if let Some(price) = self.price {
            validate_price(price)?;
            builder.set("price", FieldValue::Int(price));
        }
        if let Some(bps) = self.discount_bps {
            validate_discount_rate(bps)?;
            builder.set("discount_bps", FieldValue::Int(i64::from(bps)));
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
            builder.set("stock", FieldValue::Int(stock));
        }
        if let Some(image) = &self.image {
            let image = Some(image.trim()).filter(|i| !i.is_empty()).map(str::to_string);
            builder.set("image", FieldValue::OptText(image));
        }
        builder.set_some("status", self.status, |s| FieldValue::Text(s.as_str().to_string()));

        Ok(builder)
    }
}

/// Escapes `%`, `_` and `\` for a `LIKE .. ESCAPE '\'` pattern.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists sellable products, optionally filtered by category and a
    /// name substring, ordered by name.
    pub async fn catalog(&self, category_id: Option<i64>, search: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        let search = validate_search_query(search)?;

        debug!(?category_id, search = ?search, "Listing catalog");

        let mut query = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        query.push(" WHERE p.status = 'active'");
        if let Some(category_id) = category_id {
            query.push(" AND p.category_id = ").push_bind(category_id);
        }
        if let Some(term) = search {
            query
                .push(" AND p.name LIKE ")
                .push_bind(like_pattern(&term))
                .push(" ESCAPE '\\'");
        }
        query.push(" ORDER BY p.name COLLATE NOCASE, p.id");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        debug!(count = products.len(), "Catalog returned products");
        Ok(products)
    }

    /// Gets a product by ID regardless of status.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_in(&mut conn, id).await
    }

    /// Reads a product on the caller's connection (inside a transaction).
    pub async fn find_in(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = ?1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(product)
    }

    /// Conditional decrement: applies only if enough stock remains.
    ///
    /// ## Returns
    /// * `Ok(true)` - stock decremented by `quantity`
    /// * `Ok(false)` - product missing or stock below `quantity`; nothing changed
    pub async fn decrement_stock_in(conn: &mut SqliteConnection, id: i64, quantity: i64) -> DbResult<bool> {
        debug!(id, quantity, "Decrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Adds stock back (order void). A product deleted since is skipped.
    pub async fn restock_in(conn: &mut SqliteConnection, id: i64, quantity: i64) -> DbResult<()> {
        debug!(id, quantity, "Restocking");

        sqlx::query("UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(quantity)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: NewProduct) -> Result<Product, CatalogError> {
        let product = product.validated()?;
        debug!(name = %product.name, "Inserting product");

        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (
                category_id, name, description, price, discount_bps,
                stock, image, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'active', ?8, ?8)
            RETURNING id
            "#,
        )
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.discount_bps)
        .bind(product.stock)
        .bind(&product.image)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(self.get_by_id(id).await?.ok_or_else(|| DbError::not_found("Product", id))?)
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the updated row
    /// * `Err(NotFound)` - no product with that ID
    pub async fn update(&self, id: i64, patch: &ProductPatch) -> Result<Product, CatalogError> {
        let mut builder = patch.assignments()?;

        if builder.is_empty() {
            return Ok(self.get_by_id(id).await?.ok_or_else(|| DbError::not_found("Product", id))?);
        }

        debug!(id, columns = ?builder.columns().collect::<Vec<_>>(), "Updating product");

        builder.set("updated_at", FieldValue::Timestamp(Utc::now()));
        let result = builder
            .build("products", "id", id)
            .build()
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id).into());
        }

        Ok(self.get_by_id(id).await?.ok_or_else(|| DbError::not_found("Product", id))?)
    }

    /// Deletes the product, or deactivates it when order lines reference it.
    pub async fn archive(&self, id: i64) -> DbResult<ArchiveOutcome> {
        let mut tx = self.pool.begin().await?;
        let outcome = ArchivalPolicy::PRODUCT.archive(&mut tx, id).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE status = 'active'")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Errors from catalog operations that validate input.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Unit Tests
// =============================================================================
