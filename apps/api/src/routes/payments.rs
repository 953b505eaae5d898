//! Direct payment sessions and status polling.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::identity::ClientId;
use crate::state::AppState;
use smartsales_core::Payment;
use smartsales_db::{CheckoutReceipt, DirectSessionTarget};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments/session", post(create_session))
        .route("/payments/{payment_id}/status", get(status))
}

/// Either `order_id` or `amount_cents`, not both.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateSessionRequest {
    fn into_target(self) -> Result<DirectSessionTarget, ApiError> {
        match (self.order_id, self.amount_cents) {
            (Some(order_id), None) => Ok(DirectSessionTarget::Order { order_id }),
            (None, Some(amount_cents)) => Ok(DirectSessionTarget::Amount {
                amount_cents,
                description: self.description,
            }),
            (Some(_), Some(_)) => Err(ApiError::validation("give either order_id or amount_cents, not both")),
            (None, None) => Err(ApiError::validation("order_id or amount_cents is required")),
        }
    }
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
    Json(body): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutReceipt>)> {
    let target = body.into_target()?;
    let receipt = state.checkout.create_direct_session(&client_id, target).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Settles the payment first if the gateway already reports it paid.
async fn status(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
    Path(payment_id): Path<String>,
) -> ApiResult<Json<Payment>> {
    Ok(Json(state.reconciliation.poll_status(&client_id, &payment_id).await?))
}
