//! # HTTP Routes
//!
//! ```text
//! ┌──────────────────────────────┬───────────────┬──────────────────────────┐
//! │ Route                        │ Identity      │ Workflow                 │
//! ├──────────────────────────────┼───────────────┼──────────────────────────┤
//! │ POST   /reports/text         │ X-User-Id     │ ReportService::generate  │
//! │ POST   /reports/voice        │ X-User-Id     │ transcribe + generate    │
//! │ GET    /reports/history      │ X-User-Id     │ ReportService::history   │
//! │ GET    /cart                 │ X-Client-Id   │ CartService::lines       │
//! │ DELETE /cart                 │ X-Client-Id   │ CartService::clear       │
//! │ GET    /cart/summary         │ X-Client-Id   │ CartService::summary     │
//! │ POST   /cart/items           │ X-Client-Id   │ CartService::add_item    │
//! │ PATCH  /cart/items/{id}      │ X-Client-Id   │ update_quantity          │
//! │ DELETE /cart/items/{id}      │ X-Client-Id   │ remove_item              │
//! │ POST   /cart/checkout        │ X-Client-Id   │ CheckoutService          │
//! │ POST   /payments/session     │ X-Client-Id   │ create_direct_session    │
//! │ GET    /payments/{id}/status │ X-Client-Id   │ poll_status              │
//! │ GET    /orders               │ X-Client-Id   │ OrderRepository          │
//! │ GET    /orders/{id}          │ X-Client-Id   │ OrderRepository          │
//! │ GET    /sales                │ X-User-Id     │ SaleRepository           │
//! │ POST   /sales                │ X-User-Id     │ SaleService::create      │
//! │ DELETE /sales/{id}           │ X-User-Id     │ SaleService::delete      │
//! │ GET    /sales/stats          │ X-User-Id     │ SaleService::stats       │
//! │ POST   /webhooks/stripe      │ signature     │ ReconciliationService    │
//! │ GET    /health               │ -             │ Database::health_check   │
//! └──────────────────────────────┴───────────────┴──────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub mod cart;
pub mod orders;
pub mod payments;
pub mod reports;
pub mod sales;
pub mod webhooks;

/// All routes, without middleware or state.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(reports::router())
        .merge(cart::router())
        .merge(payments::router())
        .merge(orders::router())
        .merge(sales::router())
        .merge(webhooks::router())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = state.db.health_check().await;
    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}
