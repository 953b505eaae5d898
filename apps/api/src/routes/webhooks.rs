//! # Payment Webhook
//!
//! ```text
//! Stripe ──POST /webhooks/stripe──► verify signature ──► ReconciliationService
//!                                         │                      │
//!                                   400 on failure       200 { outcome } for every
//!                                                        verified event, including
//!                                                        unknown kinds and sessions
//!                                                        with no matching payment
//! ```
//!
//! Delivery is at-least-once; reconciliation is idempotent, so redeliveries
//! answer 200 without side effects. Storage failures answer 500 and the
//! provider retries.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::AppState;
use smartsales_core::gateway::GatewayError;
use smartsales_db::ReconcileOutcome;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/stripe", post(stripe_webhook))
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::new(ErrorCode::InvalidSignature, "Missing Stripe-Signature header"))?;

    let event = state.gateway.verify_webhook(&body, signature).map_err(|e| match e {
        GatewayError::Malformed(reason) => ApiError::validation(format!("Malformed event: {reason}")),
        other => other.into(),
    })?;

    let outcome = state.reconciliation.handle_event(&event).await?;
    info!(event_id = %event.id, outcome = ?outcome, "Webhook processed");

    Ok(Json(WebhookAck { received: true, outcome }))
}
