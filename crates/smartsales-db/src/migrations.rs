//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied on [`Database::new`](crate::Database::new):
//!
//! | File                       | Tables                                          |
//! |----------------------------|-------------------------------------------------|
//! | `001_initial_schema.sql`   | categories, products, clients, cart_items, sales |
//! | `002_orders_payments.sql`  | orders, payments                                |
//! | `003_reports_audit.sql`    | generated_reports, audit_log                    |
//!
//! sqlx records each applied file (with its checksum) in `_sqlx_migrations`;
//! editing an applied file makes startup fail, so changes go in a new
//! `NNN_*.sql`.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded. A no-op on an up-to-date store.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;

    let (total, applied) = migration_status(pool).await?;
    info!(total, applied, "Schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;
    Ok((MIGRATOR.migrations.len(), applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_every_embedded_migration_is_applied() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(applied, total);

        run_migrations(db.pool()).await.unwrap();
        assert_eq!(migration_status(db.pool()).await.unwrap(), (3, 3));
    }

    #[tokio::test]
    async fn test_stock_check_constraint_exists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ddl: String =
            sqlx::query_scalar("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'products'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert!(ddl.contains("stock >= 0"));
    }
}
