//! # Report Service
//!
//! Runs the whole dynamic report pipeline for one prompt and keeps a
//! history record of every successful run.

use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::pool::Database;
use crate::report::{build, execute};
use crate::repository::ReportHistoryEntry;
use smartsales_core::report::{GeneratedReport, OutputFormat, ReportParser, ReportRequest};
use smartsales_core::validation::validate_prompt;
use smartsales_core::REPORT_HISTORY_LIMIT;

/// A generated report together with how the prompt was interpreted.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub report: GeneratedReport,
    pub request: ReportRequest,
}

#[derive(Debug, Clone)]
pub struct ReportService {
    db: Database,
    parser: Option<ReportParser>,
}

impl ReportService {
    pub fn new(db: Database) -> Self {
        ReportService { db, parser: None }
    }

    /// Pins the parser's notion of "today".
    pub fn with_parser(mut self, parser: ReportParser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Parse → build → execute → persist.
    ///
    /// ## Arguments
    /// * `format_override` - Explicit format; wins over one named in the prompt
    ///
    /// ## Errors
    /// * `Validation` - blank or overlong prompt
    /// * `QueryExecution` - the generated query failed; nothing is stored
    pub async fn generate(
        &self,
        user_id: &str,
        prompt: &str,
        format_override: Option<OutputFormat>,
    ) -> ServiceResult<ReportOutcome> {
        let prompt = validate_prompt(prompt)?;

        let started = Instant::now();

        // A fresh parser per call so a long-running server picks up the date.
        let parser = self.parser.unwrap_or_else(ReportParser::new);
        let mut request = parser.parse(&prompt);
        if let Some(format) = format_override {
            request.output_format = format;
        }

        let query = build(&request);
        let rows = {
            let mut conn = self.db.pool().acquire().await?;
            execute(&mut conn, &query).await?
        };
        let execution_seconds = started.elapsed().as_secs_f64();

        let report = GeneratedReport {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            prompt,
            format: request.output_format,
            query_sql: query.sql,
            query_params: query.params,
            result: rows,
            execution_seconds,
            created_at: Utc::now(),
        };
        self.db.reports().insert(&report).await?;

        info!(
            report_id = %report.id,
            report_type = request.report_type.as_str(),
            group_by = request.group_by.as_str(),
            format = %report.format,
            rows = report.result.len(),
            execution_seconds,
            "Report generated"
        );

        Ok(ReportOutcome { report, request })
    }

    /// The user's most recent reports, newest first.
    pub async fn history(&self, user_id: &str) -> ServiceResult<Vec<ReportHistoryEntry>> {
        Ok(self.db.reports().history(user_id, REPORT_HISTORY_LIMIT).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use smartsales_core::report::{GroupBy, ReportType};

    use crate::error::ServiceError;
    use crate::repository::SaleRepository;
    use crate::test_support::{client, product, sale, seeded_db};

    async fn service() -> ReportService {
        let db = seeded_db().await;
        let c = db.clients().insert(&client("Ana", "ana@example.com")).await.unwrap();
        let p = db.products().insert(&product("Mouse", 1000, 50)).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        for (qty, day) in [(1, 5), (2, 20)] {
            let mut s = sale(&c.id, &p.id, qty, 1000);
            s.sold_at = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
            SaleRepository::insert(&mut conn, &s).await.unwrap();
        }
        drop(conn);

        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        ReportService::new(db).with_parser(ReportParser::with_today(today))
    }

    #[tokio::test]
    async fn test_generate_grouped_report() {
        let svc = service().await;
        let outcome = svc
            .generate("u1", "ventas agrupadas por producto del mes de marzo", None)
            .await
            .unwrap();

        assert_eq!(outcome.request.report_type, ReportType::Sales);
        assert_eq!(outcome.request.group_by, GroupBy::Product);
        assert_eq!(outcome.report.query_params, vec!["2024-03-01", "2024-03-31"]);
        assert_eq!(outcome.report.result.len(), 1);
        assert_eq!(outcome.report.result[0]["units_sold"], 3);
        assert_eq!(outcome.report.format, OutputFormat::Json);
    }

    #[tokio::test]
    async fn test_format_override_wins() {
        let svc = service().await;
        let outcome = svc.generate("u1", "ventas en pdf", Some(OutputFormat::Excel)).await.unwrap();
        assert_eq!(outcome.report.format, OutputFormat::Excel);
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected_and_not_stored() {
        let svc = service().await;
        let err = svc.generate("u1", "   ", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(_)));
        assert!(svc.history("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_lists_runs() {
        let svc = service().await;
        svc.generate("u1", "productos", None).await.unwrap();
        svc.generate("u1", "clientes", None).await.unwrap();

        let history = svc.history("u1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].prompt, "clientes");
        assert_eq!(history[0].row_count, 1);
    }
}
