//! # Audit Repository
//!
//! Append-only log of mutations. Entries are written on the same connection
//! as the change they describe, so a rolled-back workflow leaves no entry.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use smartsales_core::{AuditAction, AuditEntry};

#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Entries for one entity, oldest first.
    pub async fn list_for_entity(&self, entity: &str, entity_id: &str) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, user_id, action, entity, entity_id, description, created_at
            FROM audit_log
            WHERE entity = ?1 AND entity_id = ?2
            ORDER BY created_at, rowid
            "#,
        )
        .bind(entity)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Appends an entry on the caller's connection or transaction.
    pub async fn record(
        conn: &mut SqliteConnection,
        user_id: Option<&str>,
        action: AuditAction,
        entity: &str,
        entity_id: Option<&str>,
        description: &str,
    ) -> DbResult<()> {
        debug!(entity = %entity, entity_id = ?entity_id, action = ?action, "Audit");

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, user_id, action, entity, entity_id, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(action)
        .bind(entity)
        .bind(entity_id)
        .bind(description)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
