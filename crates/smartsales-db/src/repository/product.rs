//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Stock Mutation Sites
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Changes products.stock                           │
//! │                                                                         │
//! │  Direct sale      ──► decrement_stock_checked  (compare-and-swap)      │
//! │  Sale deletion    ──► restore_stock                                    │
//! │  Cart checkout    ──► nothing (validates only, see DESIGN.md)          │
//! │                                                                         │
//! │  ❌ WRONG: read stock, subtract in Rust, write absolute value          │
//! │     UPDATE products SET stock = 7 WHERE id = ?                         │
//! │                                                                         │
//! │  ✅ CORRECT: guarded delta in one statement                            │
//! │     UPDATE products SET stock = stock - 3                              │
//! │     WHERE id = ? AND stock >= 3                                        │
//! │                                                                         │
//! │  The CHECK (stock >= 0) constraint backs both up.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use smartsales_core::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, description, category_id, price_cents, stock, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let product = repo.get_by_id("uuid-here").await?;
///
/// // Inside a workflow transaction
/// let ok = ProductRepository::decrement_stock_checked(&mut tx, &id, 3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Counts all products, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, category_id, price_cents, stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    // =========================================================================
    // Connection-level operations (usable inside a transaction)
    // =========================================================================

    /// Reads a product on an existing connection or transaction.
    pub async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(product)
    }

    /// Decrements stock only if enough is available.
    ///
    /// ## Returns
    /// * `Ok(true)` - Stock decremented
    /// * `Ok(false)` - Not enough stock (or unknown product); nothing written
    pub async fn decrement_stock_checked(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        debug!(id = %id, quantity, "Decrementing stock");

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

    /// Returns units to stock (sale deletion).
    pub async fn restore_stock(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %id, quantity, "Restoring stock");

        sqlx::query("UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(quantity)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
