//! # Repository Module
//!
//! Database repository implementations for SmartSales.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pool methods vs. connection functions                │
//! │                                                                         │
//! │  Route handler (single read)                                           │
//! │       │  db.orders().get_by_id(&id)          ← &self, acquires from pool│
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │                                                                         │
//! │  Service workflow (multi-entity write)                                 │
//! │       │  let mut tx = pool.begin().await?;                             │
//! │       │  OrderRepository::insert(&mut tx, &order)   ← associated fn     │
//! │       │  PaymentRepository::insert(&mut tx, &pay)                      │
//! │       │  tx.commit().await?;                                           │
//! │       ▼                                                                 │
//! │  One SQLite transaction                                                │
//! │                                                                         │
//! │  A workflow holding a transaction never calls the pool methods:        │
//! │  with max_connections = 1 (in-memory tests) it would wait forever.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`] - Categories
//! - [`ProductRepository`] - Products and guarded stock changes
//! - [`ClientRepository`] - Client lookups
//! - [`CartRepository`] - Per-client cart rows
//! - [`OrderRepository`] - Orders with item snapshots
//! - [`PaymentRepository`] - Payments and the guarded completion
//! - [`SaleRepository`] - Sales and dashboard stats
//! - [`ReportRepository`] - Generated report history
//! - [`AuditRepository`] - Append-only audit log

pub mod audit;
pub mod cart;
pub mod category;
pub mod client;
pub mod order;
pub mod payment;
pub mod product;
pub mod report;
pub mod sale;

pub use audit::AuditRepository;
pub use cart::CartRepository;
pub use category::CategoryRepository;
pub use client::ClientRepository;
pub use order::OrderRepository;
pub use payment::PaymentRepository;
pub use product::ProductRepository;
pub use report::{ReportHistoryEntry, ReportRepository};
pub use sale::SaleRepository;
