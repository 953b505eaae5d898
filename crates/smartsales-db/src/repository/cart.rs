//! # Cart Repository
//!
//! Storage for per-client cart rows. All writes go through
//! [`crate::service::CartService`], which re-checks stock before touching
//! a row; checkout and reconciliation read and clear carts inside their own
//! transactions using the connection-level functions here.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use smartsales_core::{CartItem, CartLine};

const CART_ITEM_COLUMNS: &str = "id, client_id, product_id, quantity, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Cart contents with current product data, oldest row first.
    pub async fn lines(&self, client_id: &str) -> DbResult<Vec<CartLine>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_lines(&mut conn, client_id).await
    }

    // =========================================================================
    // Connection-level operations
    // =========================================================================

    pub async fn fetch_lines(conn: &mut SqliteConnection, client_id: &str) -> DbResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT
                ci.id            AS item_id,
                p.id             AS product_id,
                p.name           AS product_name,
                p.description    AS description,
                p.price_cents    AS unit_price_cents,
                ci.quantity      AS quantity,
                p.stock          AS stock
            FROM cart_items ci
            INNER JOIN products p ON p.id = ci.product_id
            WHERE ci.client_id = ?1
            ORDER BY ci.created_at, ci.id
            "#,
        )
        .bind(client_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(lines)
    }

    pub async fn find(
        conn: &mut SqliteConnection,
        client_id: &str,
        product_id: &str,
    ) -> DbResult<Option<CartItem>> {
        let sql = format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE client_id = ?1 AND product_id = ?2"
        );
        let item = sqlx::query_as::<_, CartItem>(&sql)
            .bind(client_id)
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(item)
    }

    pub async fn fetch_item(conn: &mut SqliteConnection, item_id: &str) -> DbResult<Option<CartItem>> {
        let sql = format!("SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE id = ?1");
        let item = sqlx::query_as::<_, CartItem>(&sql)
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(item)
    }

    pub async fn insert(conn: &mut SqliteConnection, item: &CartItem) -> DbResult<()> {
        debug!(client_id = %item.client_id, product_id = %item.product_id, "Inserting cart item");

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, client_id, product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.client_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn set_quantity(conn: &mut SqliteConnection, item_id: &str, quantity: i64) -> DbResult<()> {
        sqlx::query("UPDATE cart_items SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(item_id)
            .bind(quantity)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Deletes one row. Returns whether it existed.
    pub async fn delete(conn: &mut SqliteConnection, item_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?1")
            .bind(item_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Deletes every row of a client's cart. Returns the number removed.
    pub async fn clear(conn: &mut SqliteConnection, client_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE client_id = ?1")
            .bind(client_id)
            .execute(&mut *conn)
            .await?;

        debug!(client_id = %client_id, removed = result.rows_affected(), "Cleared cart");
        Ok(result.rows_affected())
    }
}
