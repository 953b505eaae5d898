//! # SmartSales API
//!
//! HTTP front of SmartSales: dynamic reports, cart and checkout, payment
//! sessions, direct sales and the payment webhook.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Components                                 │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  routes/       │  │  identity      │  │  render/                   ││
//! │  │                │  │                │  │                            ││
//! │  │ • reports      │  │ • X-User-Id    │  │ • JsonRenderer             ││
//! │  │ • cart         │  │ • X-Client-Id  │  │ • PdfRenderer              ││
//! │  │ • payments     │  │                │  │ • ExcelRenderer            ││
//! │  │ • orders/sales │  └────────────────┘  └────────────────────────────┘│
//! │  │ • webhooks     │                                                     │
//! │  └───────┬────────┘  ┌────────────────┐  ┌────────────────────────────┐│
//! │          │           │  error         │  │  transcription             ││
//! │          │           │  ApiError      │  │  HttpTranscriber           ││
//! │          ▼           │  {code,message}│  │  (voice reports)           ││
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  AppState: smartsales-db services + Arc<dyn PaymentGateway>     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`] for the environment variables.

pub mod config;
pub mod error;
pub mod identity;
pub mod render;
pub mod routes;
pub mod state;
pub mod transcription;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// The full application: routes, request tracing and CORS.
pub fn build_router(state: Arc<AppState>) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
