//! # Service Module
//!
//! Multi-entity workflows. Each public operation that writes more than one
//! row opens exactly one transaction and commits it at the end; an early
//! `return Err(..)` drops the transaction and rolls everything back.
//!
//! - [`CartService`] - Cart mutations with stock checks
//! - [`CheckoutService`] - Cart checkout and direct payment sessions
//! - [`ReconciliationService`] - Webhook / polling outcomes
//! - [`SaleService`] - Direct sales, deletion, dashboard stats
//! - [`ReportService`] - Prompt → rows → history

mod cart;
mod checkout;
mod reconcile;
mod report;
mod sale;

pub use cart::CartService;
pub use checkout::{CheckoutReceipt, CheckoutService, DirectSessionTarget};
pub use reconcile::{ReconcileOutcome, ReconciliationService};
pub use report::{ReportOutcome, ReportService};
pub use sale::SaleService;
