//! # Report History Repository
//!
//! Stores one row per successfully executed report. Rows are never updated.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use smartsales_core::report::{GeneratedReport, OutputFormat};

/// A history listing row: the report without its result payload.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReportHistoryEntry {
    pub id: String,
    pub prompt: String,
    pub format: OutputFormat,
    pub row_count: i64,
    pub execution_seconds: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    pub async fn insert(&self, report: &GeneratedReport) -> DbResult<()> {
        debug!(
            id = %report.id,
            user_id = %report.user_id,
            rows = report.result.len(),
            "Storing generated report"
        );

        sqlx::query(
            r#"
            INSERT INTO generated_reports (
                id, user_id, prompt, format, query_sql, query_params,
                result, execution_seconds, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&report.id)
        .bind(&report.user_id)
        .bind(&report.prompt)
        .bind(report.format)
        .bind(&report.query_sql)
        .bind(Json(&report.query_params))
        .bind(Json(&report.result))
        .bind(report.execution_seconds)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<GeneratedReport>> {
        let report = sqlx::query_as::<_, GeneratedReport>(
            r#"
            SELECT id, user_id, prompt, format, query_sql, query_params,
                   result, execution_seconds, created_at
            FROM generated_reports WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }

    /// A user's reports, newest first.
    pub async fn history(&self, user_id: &str, limit: i64) -> DbResult<Vec<ReportHistoryEntry>> {
        let entries = sqlx::query_as::<_, ReportHistoryEntry>(
            r#"
            SELECT id, prompt, format,
                   json_array_length(result) AS row_count,
                   execution_seconds, created_at
            FROM generated_reports
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
