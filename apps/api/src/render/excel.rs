//! Excel workbook: title, command and timestamp block, then the table from
//! row 6 with a styled header.

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use serde_json::Value;

use super::{columns, info_lines, RenderError, ReportRenderer, NO_DATA_MESSAGE};
use smartsales_core::report::{ReportMetadata, ReportRow};

/// Zero-based row where the table header goes.
const TABLE_START_ROW: u32 = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelRenderer;

impl ReportRenderer for ExcelRenderer {
    fn render(&self, rows: &[ReportRow], meta: &ReportMetadata) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(meta.report_type.title())?;

        let title = Format::new().set_bold().set_font_size(16).set_align(FormatAlign::Center);
        let label = Format::new().set_bold();
        let header = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x366092))
            .set_align(FormatAlign::Center);
        let money = Format::new().set_num_format("0.00");

        let headers = columns(rows);
        let last_col = headers.len().max(4) as u16 - 1;
        sheet.merge_range(0, 0, 0, last_col, meta.report_type.title(), &title)?;

        for (i, (name, value)) in info_lines(meta).into_iter().enumerate() {
            let row = 2 + i as u32;
            sheet.write_string_with_format(row, 0, format!("{name}:"), &label)?;
            sheet.write_string(row, 1, value)?;
        }

        if headers.is_empty() {
            sheet.write_string(TABLE_START_ROW + 1, 0, NO_DATA_MESSAGE)?;
        } else {
            for (col, name) in headers.iter().enumerate() {
                sheet.write_string_with_format(TABLE_START_ROW, col as u16, name, &header)?;
            }

            for (i, row) in rows.iter().enumerate() {
                let row_num = TABLE_START_ROW + 1 + i as u32;
                for (col, name) in headers.iter().enumerate() {
                    let col = col as u16;
                    match row.get(name).unwrap_or(&Value::Null) {
                        Value::Null => {}
                        Value::Bool(b) => {
                            sheet.write_boolean(row_num, col, *b)?;
                        }
                        Value::Number(n) if n.is_f64() => {
                            sheet.write_number_with_format(row_num, col, n.as_f64().unwrap_or_default(), &money)?;
                        }
                        Value::Number(n) => {
                            sheet.write_number(row_num, col, n.as_f64().unwrap_or_default())?;
                        }
                        Value::String(s) => {
                            sheet.write_string(row_num, col, s)?;
                        }
                        other => {
                            sheet.write_string(row_num, col, other.to_string())?;
                        }
                    }
                }
            }
        }

        sheet.autofit();

        Ok(workbook.save_to_buffer()?)
    }

    fn content_type(&self) -> &'static str {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    }

    fn file_extension(&self) -> &'static str {
        "xlsx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_rows::{meta, rows};
    use smartsales_core::report::GroupBy;

    #[test]
    fn test_workbook_is_a_zip_container() {
        let bytes = ExcelRenderer.render(&rows(5), &meta(GroupBy::Product)).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_empty_report_still_renders() {
        let bytes = ExcelRenderer.render(&[], &meta(GroupBy::None)).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
