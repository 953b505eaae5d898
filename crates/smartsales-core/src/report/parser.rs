//! # Report Command Parser
//!
//! Turns a free-text (or transcribed) command into a [`ReportRequest`].
//!
//! ## Parsing Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "Ventas agrupadas por producto del mes de marzo en PDF"               │
//! │       │ lower-case + tokenize                                           │
//! │       ▼                                                                 │
//! │  1. report type    keyword vocabularies   sales → products → clients   │
//! │  2. dates          explicit patterns, then relative phrases            │
//! │  3. group by       "agrupadas por producto"  → Product                 │
//! │  4. format         "pdf"                     → Pdf                     │
//! │  5. fields         nombre/monto/cantidad/fecha                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Parsing never fails. Fragments that look like dates but are not valid
//! calendar dates are dropped, and anything unrecognized falls back to
//! `Sales`, `Json`, `GroupBy::None`.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, Local, NaiveDate};
use regex::Regex;

use super::{FieldSelection, GroupBy, OutputFormat, ReportField, ReportRequest, ReportType};

// =============================================================================
// Vocabularies
// =============================================================================

const SALES_WORDS: &[&str] = &[
    "venta", "ventas", "compras", "transacciones",
    "sale", "sales", "purchases", "transactions",
];

const PRODUCT_WORDS: &[&str] = &[
    "producto", "productos", "artículos", "articulos", "items",
    "product", "products",
];

const CLIENT_WORDS: &[&str] = &[
    "cliente", "clientes", "compradores",
    "client", "clients", "customer", "customers", "buyers",
];

static SLASH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("slash date pattern")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("iso date pattern")
});

static MONTH_OF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:mes de|month of)\s+(\p{L}+)").expect("month phrase pattern")
});

static DAY_OF_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\s+(?:de|of)\s+(\p{L}+)(?:\s+(?:de|del|of)\s+(\d{4}))?")
        .expect("day phrase pattern")
});

static GROUP_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:agrupar|agrupad[oa]s?|group|grouped)\s+(?:por|by)\s+(\p{L}+)")
        .expect("group phrase pattern")
});

// =============================================================================
// Parser
// =============================================================================

/// Natural-language report command parser.
///
/// ## Usage
/// ```rust
/// use chrono::NaiveDate;
/// use smartsales_core::report::{OutputFormat, ReportParser, ReportType};
///
/// let parser = ReportParser::with_today(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
/// let request = parser.parse("reporte de clientes en excel");
/// assert_eq!(request.report_type, ReportType::Clients);
/// assert_eq!(request.output_format, OutputFormat::Excel);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReportParser {
    today: NaiveDate,
}

impl ReportParser {
    /// Parser anchored at the local calendar date.
    pub fn new() -> Self {
        ReportParser {
            today: Local::now().date_naive(),
        }
    }

    /// Parser anchored at a fixed date (relative phrases resolve against it).
    pub fn with_today(today: NaiveDate) -> Self {
        ReportParser { today }
    }

    /// Interprets `text`. Never fails.
    pub fn parse(&self, text: &str) -> ReportRequest {
        let lowered = text.to_lowercase();
        let tokens = tokenize(&lowered);

        ReportRequest {
            report_type: detect_report_type(&tokens),
            date_range: self.extract_dates(&lowered, &tokens),
            group_by: detect_group_by(&lowered),
            output_format: detect_format(&lowered),
            fields: detect_fields(&tokens),
            original_text: text.to_string(),
        }
    }

    /// Collects explicit dates in pattern order, keeps the first two, and
    /// falls back to relative phrases only when none matched.
    fn extract_dates(&self, text: &str, tokens: &[&str]) -> Vec<NaiveDate> {
        let year = self.today.year();
        let mut dates = Vec::new();

        for caps in SLASH_DATE.captures_iter(text) {
            if let Some(date) = ymd(&caps[3], &caps[2], &caps[1]) {
                dates.push(date);
            }
        }

        for caps in ISO_DATE.captures_iter(text) {
            if let Some(date) = ymd(&caps[1], &caps[2], &caps[3]) {
                dates.push(date);
            }
        }

        for caps in MONTH_OF.captures_iter(text) {
            if let Some((first, last)) = month_number(&caps[1]).and_then(|m| month_bounds(year, m)) {
                dates.push(first);
                dates.push(last);
            }
        }

        for caps in DAY_OF_MONTH.captures_iter(text) {
            let Some(month) = month_number(&caps[2]) else {
                continue;
            };
            let day_year = caps
                .get(3)
                .and_then(|y| y.as_str().parse().ok())
                .unwrap_or(year);
            let date = caps[1]
                .parse()
                .ok()
                .and_then(|day| NaiveDate::from_ymd_opt(day_year, month, day));
            if let Some(date) = date {
                dates.push(date);
            }
        }

        if dates.is_empty() {
            dates = self.relative_dates(tokens);
        }

        dates.truncate(2);
        dates.sort();
        dates
    }

    /// Relative phrases. First applicable wins.
    ///
    /// Words match by prefix, so inflected forms count too
    /// (`semanales` → week, `mensual` → month).
    fn relative_dates(&self, tokens: &[&str]) -> Vec<NaiveDate> {
        let today = self.today;
        let has = |word: &str| tokens.iter().any(|t| t.starts_with(word));

        if has("ayer") || has("yesterday") {
            return vec![today - Duration::days(1)];
        }
        if has("hoy") || has("today") {
            return vec![today];
        }
        if has("semana") || has("week") {
            return vec![today - Duration::days(7), today];
        }
        if (has("mes") && has("este")) || (has("this") && has("month")) {
            return vec![today.with_day(1).unwrap_or(today), today];
        }
        if (has("año") && has("este")) || (has("this") && has("year")) {
            return vec![today.with_ordinal(1).unwrap_or(today), today];
        }
        Vec::new()
    }
}

impl Default for ReportParser {
    fn default() -> Self {
        ReportParser::new()
    }
}

// =============================================================================
// Detection Helpers
// =============================================================================

fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

fn contains_any(tokens: &[&str], words: &[&str]) -> bool {
    tokens.iter().any(|t| words.contains(t))
}

fn detect_report_type(tokens: &[&str]) -> ReportType {
    if contains_any(tokens, SALES_WORDS) {
        ReportType::Sales
    } else if contains_any(tokens, PRODUCT_WORDS) {
        ReportType::Products
    } else if contains_any(tokens, CLIENT_WORDS) {
        ReportType::Clients
    } else {
        ReportType::Sales
    }
}

/// Every grouping phrase is collected, then the target is chosen by fixed
/// priority so the result does not depend on phrase order.
fn detect_group_by(text: &str) -> GroupBy {
    let targets: Vec<GroupBy> = GROUP_PHRASE
        .captures_iter(text)
        .filter_map(|caps| group_target(&caps[1]))
        .collect();

    [GroupBy::Product, GroupBy::Client, GroupBy::Month, GroupBy::Category]
        .into_iter()
        .find(|g| targets.contains(g))
        .unwrap_or(GroupBy::None)
}

fn group_target(word: &str) -> Option<GroupBy> {
    match word {
        "producto" | "productos" | "product" | "products" => Some(GroupBy::Product),
        "cliente" | "clientes" | "client" | "clients" | "customer" | "customers" => {
            Some(GroupBy::Client)
        }
        "mes" | "meses" | "month" | "months" => Some(GroupBy::Month),
        "categoría" | "categoria" | "categorías" | "categorias" | "category" | "categories" => {
            Some(GroupBy::Category)
        }
        _ => None,
    }
}

fn detect_format(text: &str) -> OutputFormat {
    if text.contains("pdf") {
        OutputFormat::Pdf
    } else if text.contains("excel") || text.contains("xlsx") {
        OutputFormat::Excel
    } else {
        OutputFormat::Json
    }
}

fn detect_fields(tokens: &[&str]) -> FieldSelection {
    let mut fields = Vec::new();

    let client_name = (contains_any(tokens, &["nombre"]) && contains_any(tokens, &["cliente", "clientes"]))
        || (contains_any(tokens, &["name"])
            && contains_any(tokens, &["client", "clients", "customer", "customers"]));
    if client_name {
        fields.push(ReportField::ClientName);
    }
    if contains_any(tokens, &["monto", "total", "amount"]) {
        fields.push(ReportField::TotalAmount);
    }
    if contains_any(tokens, &["cantidad", "quantity"]) {
        fields.push(ReportField::Quantity);
    }
    if contains_any(tokens, &["fecha", "date"]) {
        fields.push(ReportField::Date);
    }

    if fields.is_empty() {
        FieldSelection::All
    } else {
        FieldSelection::Columns(fields)
    }
}

// =============================================================================
// Calendar Helpers
// =============================================================================

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Spanish and English month names.
fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "enero" | "january" => 1,
        "febrero" | "february" => 2,
        "marzo" | "march" => 3,
        "abril" | "april" => 4,
        "mayo" | "may" => 5,
        "junio" | "june" => 6,
        "julio" | "july" => 7,
        "agosto" | "august" => 8,
        "septiembre" | "setiembre" | "september" => 9,
        "octubre" | "october" => 10,
        "noviembre" | "november" => 11,
        "diciembre" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// First and last day of a month.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parser() -> ReportParser {
        ReportParser::with_today(date(2024, 6, 12))
    }

    #[test]
    fn test_grouped_sales_for_named_month() {
        let request = parser().parse("ventas agrupadas por producto del mes de marzo");

        assert_eq!(request.report_type, ReportType::Sales);
        assert_eq!(request.group_by, GroupBy::Product);
        assert_eq!(request.date_range, vec![date(2024, 3, 1), date(2024, 3, 31)]);
        assert_eq!(request.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_unrecognized_text_defaults() {
        let request = parser().parse("hola, ¿qué tal?");

        assert_eq!(request.report_type, ReportType::Sales);
        assert_eq!(request.output_format, OutputFormat::Json);
        assert_eq!(request.group_by, GroupBy::None);
        assert!(request.date_range.is_empty());
        assert_eq!(request.fields, FieldSelection::All);
        assert_eq!(request.original_text, "hola, ¿qué tal?");
    }

    #[test]
    fn test_report_type_priority() {
        assert_eq!(parser().parse("productos y clientes").report_type, ReportType::Products);
        assert_eq!(parser().parse("ventas por cliente").report_type, ReportType::Sales);
        assert_eq!(parser().parse("top customers").report_type, ReportType::Clients);
        // Substrings of longer words are not keywords
        assert_eq!(parser().parse("inventario de productos").report_type, ReportType::Products);
    }

    #[test]
    fn test_explicit_dates_are_ordered_and_capped() {
        let request = parser().parse("ventas del 31/01/2024 al 01/01/2024 y 2024-02-01");
        assert_eq!(request.date_range, vec![date(2024, 1, 1), date(2024, 1, 31)]);
    }

    #[test]
    fn test_iso_date_single() {
        let request = parser().parse("sales since 2024-05-02");
        assert_eq!(request.date_range, vec![date(2024, 5, 2)]);
    }

    #[test]
    fn test_day_of_month_phrase() {
        let request = parser().parse("ventas del 5 de abril al 20 de abril");
        assert_eq!(request.date_range, vec![date(2024, 4, 5), date(2024, 4, 20)]);

        let request = parser().parse("sales from 3 of march of 2023");
        assert_eq!(request.date_range, vec![date(2023, 3, 3)]);
    }

    #[test]
    fn test_malformed_dates_are_swallowed() {
        assert!(parser().parse("ventas del 32/13/2024").date_range.is_empty());
        assert!(parser().parse("ventas del 30 de febrero").date_range.is_empty());
        assert!(parser().parse("ventas del mes de brumario").date_range.is_empty());
        assert!(parser().parse("sales 2024-02-30").date_range.is_empty());
    }

    #[test]
    fn test_relative_phrases() {
        let today = date(2024, 6, 12);
        assert_eq!(parser().parse("ventas de ayer").date_range, vec![date(2024, 6, 11)]);
        assert_eq!(parser().parse("sales today").date_range, vec![today]);
        assert_eq!(
            parser().parse("ventas de la semana").date_range,
            vec![date(2024, 6, 5), today]
        );
        assert_eq!(
            parser().parse("ventas de este mes").date_range,
            vec![date(2024, 6, 1), today]
        );
        assert_eq!(
            parser().parse("sales this year").date_range,
            vec![date(2024, 1, 1), today]
        );
    }

    #[test]
    fn test_relative_words_match_inflected_forms() {
        let today = date(2024, 6, 12);
        assert_eq!(
            parser().parse("ventas semanales").date_range,
            vec![date(2024, 6, 5), today]
        );
        assert_eq!(parser().parse("weekly sales").date_range, vec![date(2024, 6, 5), today]);
        assert_eq!(
            parser().parse("ventas mensuales de este mes").date_range,
            vec![date(2024, 6, 1), today]
        );
        assert!(parser().parse("ventas por producto").date_range.is_empty());
    }

    #[test]
    fn test_explicit_dates_suppress_relative_fallback() {
        let request = parser().parse("ventas de hoy 01/02/2024");
        assert_eq!(request.date_range, vec![date(2024, 2, 1)]);
    }

    #[test]
    fn test_december_month_bounds() {
        let request = parser().parse("sales for the month of december");
        assert_eq!(request.date_range, vec![date(2024, 12, 1), date(2024, 12, 31)]);
    }

    #[test]
    fn test_group_by_variants() {
        assert_eq!(parser().parse("ventas agrupado por cliente").group_by, GroupBy::Client);
        assert_eq!(parser().parse("ventas agrupar por mes").group_by, GroupBy::Month);
        assert_eq!(parser().parse("sales grouped by category").group_by, GroupBy::Category);
        assert_eq!(parser().parse("ventas agrupadas por categoría").group_by, GroupBy::Category);
        assert_eq!(parser().parse("sales group by product").group_by, GroupBy::Product);
        assert_eq!(parser().parse("ventas por producto").group_by, GroupBy::None);
    }

    #[test]
    fn test_group_by_priority_is_fixed() {
        let request = parser().parse("ventas agrupadas por mes y agrupadas por producto");
        assert_eq!(request.group_by, GroupBy::Product);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(parser().parse("ventas en pdf").output_format, OutputFormat::Pdf);
        assert_eq!(parser().parse("ventas en Excel").output_format, OutputFormat::Excel);
        assert_eq!(parser().parse("pdf o excel").output_format, OutputFormat::Pdf);
    }

    #[test]
    fn test_field_detection_keeps_order() {
        let request = parser().parse("ventas con fecha, cantidad y nombre del cliente");
        assert_eq!(
            request.fields,
            FieldSelection::Columns(vec![
                ReportField::ClientName,
                ReportField::Quantity,
                ReportField::Date,
            ])
        );

        let request = parser().parse("sales with total amount and date");
        assert_eq!(
            request.fields,
            FieldSelection::Columns(vec![ReportField::TotalAmount, ReportField::Date])
        );
    }

    #[test]
    fn test_never_more_than_two_dates() {
        let inputs = [
            "ventas 01/01/2024 02/01/2024 03/01/2024 04/01/2024",
            "mes de enero y mes de febrero",
            "1 de enero, 2 de enero, 3 de enero",
            "semana",
            "",
        ];
        for input in inputs {
            let dates = parser().parse(input).date_range;
            assert!(dates.len() <= 2, "{input}: {dates:?}");
            if dates.len() == 2 {
                assert!(dates[0] <= dates[1], "{input}: {dates:?}");
            }
        }
    }
}
