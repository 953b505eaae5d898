//! # Report Renderers
//!
//! Turn executed report rows into a downloadable document.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Vec<ReportRow> + ReportMetadata                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │   renderer_for(OutputFormat)                                            │
//! │     ├── JSON   → JsonRenderer   application/json                        │
//! │     ├── PDF    → PdfRenderer    application/pdf                         │
//! │     └── EXCEL  → ExcelRenderer  application/vnd.openxmlformats-...      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │        Vec<u8>                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Columns come from the first row's keys, in SQL projection order. An empty
//! result still renders a document carrying [`NO_DATA_MESSAGE`].

mod excel;
mod json;
mod pdf;

pub use excel::ExcelRenderer;
pub use json::JsonRenderer;
pub use pdf::PdfRenderer;

use serde_json::Value;
use thiserror::Error;

use smartsales_core::report::{GroupBy, OutputFormat, ReportMetadata, ReportRow};

/// Placeholder shown instead of a table when a report has no rows.
pub const NO_DATA_MESSAGE: &str = "No data found for this report";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel rendering failed: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// One output format.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, rows: &[ReportRow], meta: &ReportMetadata) -> Result<Vec<u8>, RenderError>;

    fn content_type(&self) -> &'static str;

    fn file_extension(&self) -> &'static str;
}

/// Renderer for a requested format.
pub fn renderer_for(format: OutputFormat) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Json => Box::new(JsonRenderer),
        OutputFormat::Pdf => Box::new(PdfRenderer::default()),
        OutputFormat::Excel => Box::new(ExcelRenderer),
    }
}

/// Header row: the first row's column names.
pub(crate) fn columns(rows: &[ReportRow]) -> Vec<String> {
    rows.first().map(|row| row.keys().cloned().collect()).unwrap_or_default()
}

/// Display text of one cell.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            // Money columns come back as x/100.0; keep two decimals.
            Some(f) if n.is_f64() => format!("{f:.2}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Informational lines printed under the title of document formats.
pub(crate) fn info_lines(meta: &ReportMetadata) -> Vec<(String, String)> {
    let mut lines = vec![
        ("Command".to_string(), meta.original_text.clone()),
        ("Generated".to_string(), meta.generated_at.format("%Y-%m-%d %H:%M").to_string()),
    ];
    if meta.group_by != GroupBy::None {
        lines.push(("Grouped by".to_string(), meta.group_by.as_str().to_string()));
    }
    lines
}
