//! # smartsales-db: Database Layer for SmartSales
//!
//! This crate provides database access and the transactional workflows of
//! SmartSales. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SmartSales Data Flow                             │
//! │                                                                         │
//! │  HTTP handler (POST /cart/checkout)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  smartsales-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   service/    │    │  repository/  │    │  report.rs   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Checkout      │───►│ CartRepo      │    │ build()      │  │   │
//! │  │   │ Reconcile     │    │ OrderRepo     │    │ execute()    │  │   │
//! │  │   │ Sale / Cart   │    │ PaymentRepo   │    │              │  │   │
//! │  │   │ Report        │    │ SaleRepo ...  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────▼───────┐    ┌───────────────┐                       │   │
//! │  │   │   Database    │    │  Migrations   │                       │   │
//! │  │   │   (pool.rs)   │    │  (embedded)   │                       │   │
//! │  │   └───────────────┘    └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (./smartsales.db)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and workflow error types
//! - [`repository`] - Repository implementations
//! - [`report`] - Report query builder and generic executor
//! - [`service`] - Transactional workflows (cart, checkout, reconciliation, sales, reports)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smartsales_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("smartsales.db")).await?;
//! let lines = db.carts().lines(&client_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod report;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};
pub use report::BuiltQuery;

pub use repository::{
    AuditRepository, CartRepository, CategoryRepository, ClientRepository, OrderRepository,
    PaymentRepository, ProductRepository, ReportHistoryEntry, ReportRepository, SaleRepository,
};
pub use service::{
    CartService, CheckoutReceipt, CheckoutService, DirectSessionTarget, ReconcileOutcome,
    ReconciliationService, ReportOutcome, ReportService, SaleService,
};

// =============================================================================
// Test Fixtures
// =============================================================================
