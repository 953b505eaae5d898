//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Where Sales Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Origins                                      │
//! │                                                                         │
//! │  1. DIRECT SALE (admin)                                                │
//! │     └── SaleService::create_direct_sale()                              │
//! │         └── insert() + ProductRepository::decrement_stock_checked()    │
//! │                                                                         │
//! │  2. CART PAYMENT COMPLETED (webhook / polling)                         │
//! │     └── ReconciliationService::complete_session()                      │
//! │         └── insert() once per Order item, stock untouched              │
//! │                                                                         │
//! │  3. DELETION                                                           │
//! │     └── SaleService::delete_sale()                                     │
//! │         └── ProductRepository::restore_stock() + delete()              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use smartsales_core::{Money, Sale, SaleStatus, SalesStats};

const SALE_COLUMNS: &str =
    "id, client_id, product_id, quantity, unit_price_cents, total_cents, status, sold_at, updated_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct TotalsRow {
    count: i64,
    revenue: i64,
}

#[derive(Debug, FromRow)]
struct BestSellerRow {
    name: String,
    units: i64,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    /// Most recent sales first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY sold_at DESC LIMIT ?1");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Sales belonging to one client, oldest first.
    pub async fn list_for_client(&self, client_id: &str) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE client_id = ?1 ORDER BY sold_at");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Dashboard figures over completed sales.
    ///
    /// ## Arguments
    /// * `now` - Reference instant for the 30-day window
    pub async fn stats(&self, now: DateTime<Utc>) -> DbResult<SalesStats> {
        let since = now - Duration::days(30);

        let all: TotalsRow = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS count, COALESCE(SUM(total_cents), 0) AS revenue
            FROM sales WHERE status = ?1
            "#,
        )
        .bind(SaleStatus::Completed)
        .fetch_one(&self.pool)
        .await?;

        let recent: TotalsRow = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS count, COALESCE(SUM(total_cents), 0) AS revenue
            FROM sales WHERE status = ?1 AND sold_at >= ?2
            "#,
        )
        .bind(SaleStatus::Completed)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let best: Option<BestSellerRow> = sqlx::query_as(
            r#"
            SELECT p.name AS name, SUM(s.quantity) AS units
            FROM sales s
            INNER JOIN products p ON p.id = s.product_id
            WHERE s.status = ?1
            GROUP BY p.id, p.name
            ORDER BY units DESC, p.name
            LIMIT 1
            "#,
        )
        .bind(SaleStatus::Completed)
        .fetch_optional(&self.pool)
        .await?;

        let average_sale_cents = if all.count > 0 { all.revenue / all.count } else { 0 };

        Ok(SalesStats {
            total_sales: all.count,
            sales_last_30_days: recent.count,
            total_revenue_cents: all.revenue,
            revenue_last_30_days_cents: recent.revenue,
            average_sale_cents,
            best_selling_units: best.as_ref().map(|b| b.units).unwrap_or(0),
            best_selling_product: best.map(|b| b.name),
        })
    }

    // =========================================================================
    // Connection-level operations
    // =========================================================================

    pub async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(sale)
    }

    /// Inserts a sale. The stored total is recomputed from quantity and
    /// unit price; whatever `sale.total_cents` holds is ignored.
    pub async fn insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        let total_cents = Money::from_cents(sale.unit_price_cents)
            .checked_multiply_quantity(sale.quantity)
            .ok_or_else(|| DbError::CheckViolation {
                message: format!(
                    "sale total overflows: {} × {}",
                    sale.quantity, sale.unit_price_cents
                ),
            })?
            .cents();

        debug!(
            id = %sale.id,
            product_id = %sale.product_id,
            quantity = sale.quantity,
            total_cents,
            "Inserting sale"
        );

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, client_id, product_id, quantity, unit_price_cents,
                total_cents, status, sold_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.client_id)
        .bind(&sale.product_id)
        .bind(sale.quantity)
        .bind(sale.unit_price_cents)
        .bind(total_cents)
        .bind(sale.status)
        .bind(sale.sold_at)
        .bind(sale.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Deletes a sale row. Returns whether it existed.
    pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
