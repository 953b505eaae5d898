//! # Report Query Builder and Executor
//!
//! Turns a parsed [`ReportRequest`] into SQL with bound parameters and runs
//! it, decoding every row generically.
//!
//! ## Query Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  report_type   group_by    projection                                   │
//! │  ───────────   ────────    ──────────────────────────────────────────── │
//! │  sales         none        id, date, client_name, product_name,         │
//! │                            quantity, unit_price, total_amount           │
//! │  sales         product     product_name, sale_count, units_sold,        │
//! │                            total_amount                                 │
//! │  sales         client      client_name, purchase_count, total_amount    │
//! │  sales         month       month, sale_count, units_sold, total_amount  │
//! │  sales         category    category_name, sale_count, units_sold,       │
//! │                            total_amount                                 │
//! │  products      (ignored)   name, category, price, stock, sale_count,    │
//! │                            units_sold                                   │
//! │  clients       (ignored)   name, email, phone, purchase_count,          │
//! │                            total_spent                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Parameters
//! Dates are never spliced into the SQL text. They are bound as ISO strings
//! and compared against `date(s.sold_at)`:
//!
//! ```text
//! date_range = []            → no WHERE
//! date_range = [d1]          → WHERE date(s.sold_at) >= ?
//! date_range = [d1, d2]      → WHERE date(s.sold_at) >= ? AND date(s.sold_at) <= ?
//! ```

use serde::Serialize;
use serde_json::{Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqliteConnection, TypeInfo, ValueRef};
use tracing::{debug, error};

use crate::error::{ServiceError, ServiceResult};
use smartsales_core::report::{GroupBy, ReportRequest, ReportRow, ReportType};

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<String>,
}

// =============================================================================
// Builder
// =============================================================================

/// Builds the query for a request. Pure; never touches the database.
pub fn build(request: &ReportRequest) -> BuiltQuery {
    match request.report_type {
        ReportType::Sales => build_sales(request),
        ReportType::Products => BuiltQuery {
            sql: PRODUCTS_SQL.to_string(),
            params: Vec::new(),
        },
        ReportType::Clients => BuiltQuery {
            sql: CLIENTS_SQL.to_string(),
            params: Vec::new(),
        },
    }
}

const PRODUCTS_SQL: &str = "\
SELECT p.name AS name, \
cat.name AS category, \
CAST(p.price_cents AS REAL) / 100.0 AS price, \
p.stock AS stock, \
COUNT(s.id) AS sale_count, \
COALESCE(SUM(s.quantity), 0) AS units_sold \
FROM products p \
LEFT JOIN categories cat ON cat.id = p.category_id \
LEFT JOIN sales s ON s.product_id = p.id \
GROUP BY p.id, p.name, cat.name, p.price_cents, p.stock \
ORDER BY p.name";

const CLIENTS_SQL: &str = "\
SELECT c.name AS name, \
c.email AS email, \
c.phone AS phone, \
COUNT(s.id) AS purchase_count, \
CAST(COALESCE(SUM(s.total_cents), 0) AS REAL) / 100.0 AS total_spent \
FROM clients c \
LEFT JOIN sales s ON s.client_id = c.id \
GROUP BY c.id, c.name, c.email, c.phone \
ORDER BY c.name";

const TOTAL_AMOUNT: &str = "CAST(SUM(s.total_cents) AS REAL) / 100.0 AS total_amount";

fn build_sales(request: &ReportRequest) -> BuiltQuery {
    let (filter, params) = date_filter(request);

    let sql = match request.group_by {
        GroupBy::None => format!(
            "SELECT s.id AS id, \
             date(s.sold_at) AS date, \
             c.name AS client_name, \
             p.name AS product_name, \
             s.quantity AS quantity, \
             CAST(s.unit_price_cents AS REAL) / 100.0 AS unit_price, \
             CAST(s.total_cents AS REAL) / 100.0 AS total_amount \
             FROM sales s \
             INNER JOIN clients c ON c.id = s.client_id \
             INNER JOIN products p ON p.id = s.product_id\
             {filter} \
             ORDER BY s.sold_at, s.id"
        ),
        GroupBy::Product => format!(
            "SELECT p.name AS product_name, \
             COUNT(s.id) AS sale_count, \
             SUM(s.quantity) AS units_sold, \
             {TOTAL_AMOUNT} \
             FROM sales s \
             INNER JOIN products p ON p.id = s.product_id\
             {filter} \
             GROUP BY p.id, p.name \
             ORDER BY total_amount DESC, p.name"
        ),
        GroupBy::Client => format!(
            "SELECT c.name AS client_name, \
             COUNT(s.id) AS purchase_count, \
             {TOTAL_AMOUNT} \
             FROM sales s \
             INNER JOIN clients c ON c.id = s.client_id\
             {filter} \
             GROUP BY c.id, c.name \
             ORDER BY total_amount DESC, c.name"
        ),
        GroupBy::Month => format!(
            "SELECT strftime('%Y-%m-01', s.sold_at) AS month, \
             COUNT(s.id) AS sale_count, \
             SUM(s.quantity) AS units_sold, \
             {TOTAL_AMOUNT} \
             FROM sales s\
             {filter} \
             GROUP BY month \
             ORDER BY month"
        ),
        GroupBy::Category => format!(
            "SELECT COALESCE(cat.name, 'Uncategorized') AS category_name, \
             COUNT(s.id) AS sale_count, \
             SUM(s.quantity) AS units_sold, \
             {TOTAL_AMOUNT} \
             FROM sales s \
             INNER JOIN products p ON p.id = s.product_id \
             LEFT JOIN categories cat ON cat.id = p.category_id\
             {filter} \
             GROUP BY cat.id, cat.name \
             ORDER BY total_amount DESC, category_name"
        ),
    };

    BuiltQuery { sql, params }
}

/// ` WHERE ...` clause (with leading space) and its parameters.
fn date_filter(request: &ReportRequest) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(start) = request.start_date() {
        clauses.push("date(s.sold_at) >= ?");
        params.push(start.format("%Y-%m-%d").to_string());
    }
    if let Some(end) = request.end_date() {
        clauses.push("date(s.sold_at) <= ?");
        params.push(end.format("%Y-%m-%d").to_string());
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Runs a built query and decodes every row in projection order.
///
/// ## Errors
/// Any failure (SQL or decode) becomes [`ServiceError::QueryExecution`]. It
/// is logged here and never retried.
pub async fn execute(conn: &mut SqliteConnection, query: &BuiltQuery) -> ServiceResult<Vec<ReportRow>> {
    debug!(sql = %query.sql, params = ?query.params, "Executing report query");

    let mut q = sqlx::query(&query.sql);
    for param in &query.params {
        q = q.bind(param);
    }

    let rows = q.fetch_all(&mut *conn).await.map_err(|e| {
        error!(error = %e, sql = %query.sql, "Report query failed");
        ServiceError::QueryExecution(e.to_string())
    })?;

    rows.iter()
        .map(decode_row)
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_err(|e| {
            error!(error = %e, "Report row decode failed");
            ServiceError::QueryExecution(e.to_string())
        })
}

fn decode_row(row: &SqliteRow) -> Result<ReportRow, sqlx::Error> {
    let mut out = ReportRow::new();

    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            // Storage class of this value, not the declared column type:
            // computed columns have no declared type.
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" => Value::from(row.try_get_unchecked::<i64, _>(i)?),
                "REAL" | "NUMERIC" => Number::from_f64(row.try_get_unchecked::<f64, _>(i)?)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                "BLOB" => Value::String(hex::encode(row.try_get_unchecked::<Vec<u8>, _>(i)?)),
                _ => Value::String(row.try_get_unchecked::<String, _>(i)?),
            }
        };

        out.insert(column.name().to_string(), value);
    }

    Ok(out)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use smartsales_core::report::{FieldSelection, OutputFormat};

    use crate::repository::SaleRepository;
    use crate::test_support::{category, client, product, sale, seeded_db};

    fn request(report_type: ReportType, group_by: GroupBy, dates: &[(i32, u32, u32)]) -> ReportRequest {
        ReportRequest {
            report_type,
            date_range: dates
                .iter()
                .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(*y, *m, *d))
                .collect(),
            group_by,
            output_format: OutputFormat::Json,
            fields: FieldSelection::All,
            original_text: String::new(),
        }
    }

    #[test]
    fn test_dates_are_bound_not_spliced() {
        let q = build(&request(ReportType::Sales, GroupBy::None, &[(2024, 3, 1), (2024, 3, 31)]));
        assert!(q.sql.contains("date(s.sold_at) >= ? AND date(s.sold_at) <= ?"));
        assert!(!q.sql.contains("2024"));
        assert_eq!(q.params, vec!["2024-03-01", "2024-03-31"]);
    }

    #[test]
    fn test_single_date_is_lower_bound_only() {
        let q = build(&request(ReportType::Sales, GroupBy::Client, &[(2024, 5, 2)]));
        assert!(q.sql.contains("WHERE date(s.sold_at) >= ?"));
        assert!(!q.sql.contains("<= ?"));
        assert_eq!(q.params, vec!["2024-05-02"]);
    }

    #[test]
    fn test_no_dates_no_where() {
        let q = build(&request(ReportType::Sales, GroupBy::Month, &[]));
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_products_and_clients_ignore_filters() {
        for t in [ReportType::Products, ReportType::Clients] {
            let q = build(&request(t, GroupBy::Product, &[(2024, 1, 1), (2024, 2, 1)]));
            assert!(q.params.is_empty());
            assert!(!q.sql.contains('?'));
            assert!(q.sql.contains("LEFT JOIN sales"));
        }
    }

    /// Seeds three sales in March and one in April (two products, two clients).
    async fn seeded() -> crate::Database {
        let db = seeded_db().await;
        let cat = db.categories().insert(&category("Peripherals")).await.unwrap();
        let ana = db.clients().insert(&client("Ana", "ana@example.com")).await.unwrap();
        let ben = db.clients().insert(&client("Ben", "ben@example.com")).await.unwrap();
        let mut mouse = product("Mouse", 1050, 50);
        mouse.category_id = Some(cat.id.clone());
        let mouse = db.products().insert(&mouse).await.unwrap();
        let desk = db.products().insert(&product("Desk", 20000, 5)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        for (c, p, qty, price, day) in [
            (&ana.id, &mouse.id, 2, 1050, (2024, 3, 4)),
            (&ben.id, &mouse.id, 1, 1050, (2024, 3, 15)),
            (&ana.id, &desk.id, 1, 20000, (2024, 3, 31)),
            (&ben.id, &desk.id, 1, 20000, (2024, 4, 1)),
        ] {
            let mut s = sale(c, p, qty, price);
            s.sold_at = Utc.with_ymd_and_hms(day.0, day.1, day.2, 15, 30, 0).unwrap();
            SaleRepository::insert(&mut conn, &s).await.unwrap();
        }
        drop(conn);
        db
    }

    async fn run(db: &crate::Database, req: &ReportRequest) -> Vec<ReportRow> {
        let mut conn = db.pool().acquire().await.unwrap();
        execute(&mut conn, &build(req)).await.unwrap()
    }

    fn sum_total(rows: &[ReportRow]) -> f64 {
        rows.iter().map(|r| r["total_amount"].as_f64().unwrap()).sum()
    }

    #[tokio::test]
    async fn test_sales_rows_keep_projection_order() {
        let db = seeded().await;
        let rows = run(&db, &request(ReportType::Sales, GroupBy::None, &[(2024, 3, 1), (2024, 3, 31)])).await;

        assert_eq!(rows.len(), 3);
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["id", "date", "client_name", "product_name", "quantity", "unit_price", "total_amount"]
        );
        assert_eq!(rows[0]["date"], "2024-03-04");
        assert_eq!(rows[0]["quantity"], 2);
        assert_eq!(rows[0]["unit_price"].as_f64(), Some(10.5));
        assert_eq!(rows[0]["total_amount"].as_f64(), Some(21.0));
        // Inclusive upper bound on a sale late in the day.
        assert_eq!(rows[2]["date"], "2024-03-31");
    }

    #[tokio::test]
    async fn test_grouped_totals_match_ungrouped() {
        let db = seeded().await;
        let march = [(2024, 3, 1), (2024, 3, 31)];
        let flat = run(&db, &request(ReportType::Sales, GroupBy::None, &march)).await;

        for group in [GroupBy::Product, GroupBy::Client, GroupBy::Month, GroupBy::Category] {
            let grouped = run(&db, &request(ReportType::Sales, group, &march)).await;
            assert!(!grouped[0].contains_key("id"), "{group:?} returned per-sale rows");
            assert!((sum_total(&grouped) - sum_total(&flat)).abs() < 1e-9, "{group:?}");
        }
    }

    #[tokio::test]
    async fn test_group_by_product_shape() {
        let db = seeded().await;
        let rows = run(&db, &request(ReportType::Sales, GroupBy::Product, &[])).await;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["product_name"], "Desk");
        assert_eq!(rows[0]["sale_count"], 2);
        assert_eq!(rows[1]["product_name"], "Mouse");
        assert_eq!(rows[1]["units_sold"], 3);
    }

    #[tokio::test]
    async fn test_group_by_month_and_category() {
        let db = seeded().await;

        let months = run(&db, &request(ReportType::Sales, GroupBy::Month, &[])).await;
        let labels: Vec<&str> = months.iter().map(|r| r["month"].as_str().unwrap()).collect();
        assert_eq!(labels, ["2024-03-01", "2024-04-01"]);

        let cats = run(&db, &request(ReportType::Sales, GroupBy::Category, &[])).await;
        let names: Vec<&str> = cats.iter().map(|r| r["category_name"].as_str().unwrap()).collect();
        assert_eq!(names, ["Uncategorized", "Peripherals"]);
    }

    #[tokio::test]
    async fn test_products_report_defaults_to_zero() {
        let db = seeded().await;
        db.products().insert(&product("Unsold", 100, 1)).await.unwrap();

        let rows = run(&db, &request(ReportType::Products, GroupBy::None, &[])).await;
        let unsold = rows.iter().find(|r| r["name"] == "Unsold").unwrap();
        assert_eq!(unsold["sale_count"], 0);
        assert_eq!(unsold["units_sold"], 0);
        assert_eq!(unsold["category"], Value::Null);
    }

    #[tokio::test]
    async fn test_clients_report() {
        let db = seeded().await;
        let rows = run(&db, &request(ReportType::Clients, GroupBy::None, &[])).await;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Ana");
        assert_eq!(rows[0]["purchase_count"], 2);
        assert_eq!(rows[0]["total_spent"].as_f64(), Some(221.0));
    }

    #[tokio::test]
    async fn test_bad_sql_is_query_execution_error() {
        let db = seeded_db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let bad = BuiltQuery {
            sql: "SELECT nope FROM nowhere".into(),
            params: vec![],
        };
        let result = execute(&mut conn, &bad).await;
        assert!(matches!(result, Err(ServiceError::QueryExecution(_))));
    }
}
