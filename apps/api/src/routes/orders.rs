//! A client's orders.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::identity::ClientId;
use crate::state::AppState;
use smartsales_core::Order;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{order_id}", get(get_order))
}

async fn list_orders(State(state): State<Arc<AppState>>, ClientId(client_id): ClientId) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.db.orders().list_for_client(&client_id).await?))
}

/// Other clients' orders answer 404.
async fn get_order(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Order>> {
    match state.db.orders().get_by_id(&order_id).await? {
        Some(order) if order.client_id == client_id => Ok(Json(order)),
        _ => Err(ApiError::not_found("Order", &order_id)),
    }
}
