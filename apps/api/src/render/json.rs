//! JSON document: metadata, row count and the rows as returned by the query.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RenderError, ReportRenderer, NO_DATA_MESSAGE};
use smartsales_core::report::{GroupBy, ReportMetadata, ReportRow, ReportType};

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    title: &'static str,
    report_type: ReportType,
    group_by: GroupBy,
    original_text: &'a str,
    generated_at: DateTime<Utc>,
    row_count: usize,
    rows: &'a [ReportRow],
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, rows: &[ReportRow], meta: &ReportMetadata) -> Result<Vec<u8>, RenderError> {
        let document = JsonDocument {
            title: meta.report_type.title(),
            report_type: meta.report_type,
            group_by: meta.group_by,
            original_text: &meta.original_text,
            generated_at: meta.generated_at,
            row_count: rows.len(),
            rows,
            message: rows.is_empty().then_some(NO_DATA_MESSAGE),
        };
        Ok(serde_json::to_vec(&document)?)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_rows::{meta, rows};
    use serde_json::Value;

    #[test]
    fn test_document_shape() {
        let bytes = JsonRenderer.render(&rows(2), &meta(GroupBy::Product)).unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(doc["title"], "Sales Report");
        assert_eq!(doc["group_by"], "product");
        assert_eq!(doc["row_count"], 2);
        assert_eq!(doc["rows"][1]["product_name"], "Producto 1");
        assert!(doc.get("message").is_none());
    }

    #[test]
    fn test_empty_rows_carry_placeholder() {
        let bytes = JsonRenderer.render(&[], &meta(GroupBy::None)).unwrap();
        let doc: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["row_count"], 0);
        assert_eq!(doc["message"], NO_DATA_MESSAGE);
    }
}
