//! # Payment Repository
//!
//! ## Idempotent Completion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Webhook delivery is at-least-once. Two deliveries of the same         │
//! │  checkout.session.completed may race:                                  │
//! │                                                                         │
//! │  Delivery A: find_pending_by_session ──► mark_completed ──► rows = 1   │
//! │  Delivery B: find_pending_by_session ──► mark_completed ──► rows = 0   │
//! │                                                           (no sales)   │
//! │                                                                         │
//! │  mark_completed is guarded by `status = 'pending'`, so only one        │
//! │  transaction ever wins the transition.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use smartsales_core::{Payment, PaymentStatus};

const PAYMENT_COLUMNS: &str = "id, client_id, order_id, sale_id, method, amount_cents, currency, \
     status, session_id, payment_intent_id, description, metadata, paid_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    pub async fn get_by_session(&self, session_id: &str) -> DbResult<Option<Payment>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_session(&mut conn, session_id).await
    }

    // =========================================================================
    // Connection-level operations
    // =========================================================================

    pub async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1");
        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(payment)
    }

    /// Payment for a gateway session, whatever its state.
    pub async fn find_by_session(conn: &mut SqliteConnection, session_id: &str) -> DbResult<Option<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE session_id = ?1");
        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(session_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(payment)
    }

    /// Payment for a gateway session, only while still pending.
    pub async fn find_pending_by_session(
        conn: &mut SqliteConnection,
        session_id: &str,
    ) -> DbResult<Option<Payment>> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE session_id = ?1 AND status = ?2"
        );
        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(session_id)
            .bind(PaymentStatus::Pending)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(payment)
    }

    pub async fn insert(conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
        debug!(
            id = %payment.id,
            amount_cents = payment.amount_cents,
            session_id = ?payment.session_id,
            "Inserting payment"
        );

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, client_id, order_id, sale_id, method, amount_cents, currency,
                status, session_id, payment_intent_id, description, metadata,
                paid_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.client_id)
        .bind(&payment.order_id)
        .bind(&payment.sale_id)
        .bind(payment.method)
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(payment.status)
        .bind(&payment.session_id)
        .bind(&payment.payment_intent_id)
        .bind(&payment.description)
        .bind(Json(&payment.metadata))
        .bind(payment.paid_at)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Moves a pending payment to completed.
    ///
    /// ## Returns
    /// * `Ok(true)` - This call performed the transition
    /// * `Ok(false)` - The payment was no longer pending; nothing written
    pub async fn mark_completed(
        conn: &mut SqliteConnection,
        id: &str,
        payment_intent_id: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = ?2,
                payment_intent_id = COALESCE(?3, payment_intent_id),
                paid_at = ?4,
                updated_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(id)
        .bind(PaymentStatus::Completed)
        .bind(payment_intent_id)
        .bind(paid_at)
        .bind(PaymentStatus::Pending)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Writes a new status (already checked against the transition table).
    pub async fn set_status(conn: &mut SqliteConnection, id: &str, status: PaymentStatus) -> DbResult<()> {
        debug!(id = %id, status = %status, "Updating payment status");

        sqlx::query("UPDATE payments SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Records the sale a completed payment produced.
    pub async fn link_sale(conn: &mut SqliteConnection, id: &str, sale_id: &str) -> DbResult<()> {
        sqlx::query("UPDATE payments SET sale_id = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(sale_id)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
