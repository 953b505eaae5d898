//! # Report Module
//!
//! The request model of the dynamic report pipeline and the command parser
//! that produces it.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Dynamic Report Pipeline                             │
//! │                                                                         │
//! │  "ventas agrupadas por producto del mes de marzo en pdf"               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportParser::parse ← THIS MODULE (never fails)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportRequest { Sales, [03-01, 03-31], Product, Pdf, All }            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  smartsales_db::report::build → BuiltQuery { sql, params }             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  smartsales_db::report::execute → Vec<ReportRow>                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportRenderer (JSON / PDF / Excel) → bytes                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod parser;

pub use parser::ReportParser;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// =============================================================================
// Closed Vocabularies
// =============================================================================

/// Which entity a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Sales,
    Products,
    Clients,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Sales => "sales",
            ReportType::Products => "products",
            ReportType::Clients => "clients",
        }
    }

    /// Human title used by the document renderers.
    pub fn title(&self) -> &'static str {
        match self {
            ReportType::Sales => "Sales Report",
            ReportType::Products => "Products Report",
            ReportType::Clients => "Clients Report",
        }
    }
}

impl Default for ReportType {
    fn default() -> Self {
        ReportType::Sales
    }
}

/// Aggregation applied to a sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    None,
    Product,
    Client,
    Month,
    Category,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::None => "none",
            GroupBy::Product => "product",
            GroupBy::Client => "client",
            GroupBy::Month => "month",
            GroupBy::Category => "category",
        }
    }
}

impl Default for GroupBy {
    fn default() -> Self {
        GroupBy::None
    }
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    Json,
    Pdf,
    Excel,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "JSON",
            OutputFormat::Pdf => "PDF",
            OutputFormat::Excel => "EXCEL",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Json
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an explicit format override (`?format=pdf`), case-insensitively.
impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pdf" => Ok(OutputFormat::Pdf),
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            _ => Err(ValidationError::NotAllowed {
                field: "format".to_string(),
                allowed: vec!["JSON".into(), "PDF".into(), "EXCEL".into()],
            }),
        }
    }
}

/// A column the user asked for by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    ClientName,
    TotalAmount,
    Quantity,
    Date,
}

/// Requested columns: either everything or an ordered, de-duplicated list.
///
/// ## Note
/// The query builder always projects its full column set. The selection is
/// echoed back with the interpreted command so clients can narrow the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSelection {
    All,
    Columns(Vec<ReportField>),
}

impl Default for FieldSelection {
    fn default() -> Self {
        FieldSelection::All
    }
}

// =============================================================================
// Report Request
// =============================================================================

/// The structured interpretation of a natural-language report command.
///
/// Created once per invocation by [`ReportParser`], consumed once by the
/// query builder, never mutated in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub report_type: ReportType,

    /// Zero, one or two dates. When two are present they are ordered.
    pub date_range: Vec<NaiveDate>,

    pub group_by: GroupBy,
    pub output_format: OutputFormat,
    pub fields: FieldSelection,

    /// The command as typed or transcribed.
    pub original_text: String,
}

impl ReportRequest {
    /// Lower bound of the date filter, if any.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.date_range.first().copied()
    }

    /// Upper bound of the date filter. Only present with two dates.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.date_range.get(1).copied()
    }
}

// =============================================================================
// Report Results
// =============================================================================

/// One result row: column name → scalar, in SQL projection order.
pub type ReportRow = serde_json::Map<String, serde_json::Value>;

/// Context handed to renderers alongside the rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub report_type: ReportType,
    pub group_by: GroupBy,
    pub original_text: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportMetadata {
    pub fn for_request(request: &ReportRequest, generated_at: DateTime<Utc>) -> Self {
        ReportMetadata {
            report_type: request.report_type,
            group_by: request.group_by,
            original_text: request.original_text.clone(),
            generated_at,
        }
    }
}

/// Persisted audit record of one executed report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct GeneratedReport {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub format: OutputFormat,

    /// Executed SQL text.
    pub query_sql: String,

    /// Bound parameters, in placeholder order.
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub query_params: Vec<String>,

    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub result: Vec<ReportRow>,

    /// Wall-clock duration of build + execute, in seconds.
    pub execution_seconds: f64,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_override() {
        assert_eq!("pdf".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!(" Excel ".parse::<OutputFormat>().unwrap(), OutputFormat::Excel);
        assert_eq!("XLSX".parse::<OutputFormat>().unwrap(), OutputFormat::Excel);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_request_bounds() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let mut request = ReportRequest {
            report_type: ReportType::Sales,
            date_range: vec![d1],
            group_by: GroupBy::None,
            output_format: OutputFormat::Json,
            fields: FieldSelection::All,
            original_text: String::new(),
        };
        assert_eq!(request.start_date(), Some(d1));
        assert_eq!(request.end_date(), None);

        request.date_range.push(d2);
        assert_eq!(request.end_date(), Some(d2));
    }

    #[test]
    fn test_format_serializes_uppercase() {
        let json = serde_json::to_string(&OutputFormat::Excel).unwrap();
        assert_eq!(json, "\"EXCEL\"");
    }
}
