//! # Order Repository
//!
//! Orders own their item snapshot as a JSON column; nothing here reads the
//! cart or product tables.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use smartsales_core::{Order, OrderStatus};

const ORDER_COLUMNS: &str = "id, client_id, items, total_cents, status, payment_id, \
     shipping_address, completed_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// A client's orders, newest first.
    pub async fn list_for_client(&self, client_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE client_id = ?1 ORDER BY created_at DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    // =========================================================================
    // Connection-level operations
    // =========================================================================

    pub async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(order)
    }

    pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total_cents = order.total_cents, items = order.items.len(), "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, client_id, items, total_cents, status, payment_id,
                shipping_address, completed_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&order.id)
        .bind(&order.client_id)
        .bind(Json(&order.items))
        .bind(order.total_cents)
        .bind(order.status)
        .bind(&order.payment_id)
        .bind(&order.shipping_address)
        .bind(order.completed_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Sets the order side of the payment ↔ order back-reference.
    pub async fn link_payment(conn: &mut SqliteConnection, order_id: &str, payment_id: &str) -> DbResult<()> {
        sqlx::query("UPDATE orders SET payment_id = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(order_id)
            .bind(payment_id)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Writes a new status (already checked against the transition table).
    pub async fn set_status(
        conn: &mut SqliteConnection,
        order_id: &str,
        status: OrderStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> DbResult<()> {
        debug!(order_id = %order_id, status = %status, "Updating order status");

        sqlx::query(
            r#"
            UPDATE orders
            SET status = ?2, completed_at = COALESCE(?3, completed_at), updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(completed_at)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
