//! # smartsales-core: Pure Business Logic for SmartSales
//!
//! This crate is the **heart** of SmartSales. It contains the domain model,
//! the natural-language report command parser and the order/payment state
//! machine as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SmartSales Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │   /reports/text  /cart/checkout  /payments  /webhooks/stripe    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ smartsales-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  report   │  │ lifecycle │  │  gateway  │  │   │
//! │  │   │  Order    │  │  Parser   │  │ Payment ⇄ │  │  trait    │  │   │
//! │  │   │  Payment  │  │  Request  │  │  Order    │  │  events   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              smartsales-db (Database Layer)                     │   │
//! │  │     SQLite queries, report query builder, transactions          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Payment, Sale, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`report`] - Report request model and the command parser
//! - [`lifecycle`] - Order/payment transition tables
//! - [`gateway`] - Payment gateway contract
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use smartsales_core::report::{GroupBy, ReportParser, ReportType};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
//! let request = ReportParser::with_today(today)
//!     .parse("ventas agrupadas por producto del mes de marzo");
//!
//! assert_eq!(request.report_type, ReportType::Sales);
//! assert_eq!(request.group_by, GroupBy::Product);
//! assert_eq!(request.date_range.len(), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product in a cart or a direct sale.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a report prompt (typed or transcribed).
pub const MAX_PROMPT_LENGTH: usize = 1000;

/// How many generated reports the history listing returns.
pub const REPORT_HISTORY_LIMIT: i64 = 50;

/// Default ISO currency for payments.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Metadata key holding the order id on payments and gateway sessions.
pub const META_ORDER_ID: &str = "order_id";

/// Metadata key holding the payment origin (`cart` or `direct`).
pub const META_KIND: &str = "kind";
