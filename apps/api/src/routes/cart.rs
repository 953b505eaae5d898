//! Cart endpoints. Every mutation answers with the resulting cart.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::identity::ClientId;
use crate::state::AppState;
use smartsales_core::{CartLine, CartSummary};
use smartsales_db::CheckoutReceipt;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/summary", get(summary))
        .route("/cart/items", post(add_item))
        .route("/cart/items/{item_id}", patch(update_item).delete(remove_item))
        .route("/cart/checkout", post(checkout))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    /// Zero removes the line.
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLine>,
    pub summary: CartSummary,
}

impl From<Vec<CartLine>> for CartResponse {
    fn from(items: Vec<CartLine>) -> Self {
        let summary = CartSummary::from_lines(&items);
        CartResponse { items, summary }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: u64,
}

async fn get_cart(State(state): State<Arc<AppState>>, ClientId(client_id): ClientId) -> ApiResult<Json<CartResponse>> {
    Ok(Json(state.carts.lines(&client_id).await?.into()))
}

async fn summary(State(state): State<Arc<AppState>>, ClientId(client_id): ClientId) -> ApiResult<Json<CartSummary>> {
    Ok(Json(state.carts.summary(&client_id).await?))
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
    Json(body): Json<AddItemRequest>,
) -> ApiResult<Json<CartResponse>> {
    let lines = state
        .carts
        .add_item(&client_id, &body.product_id, body.quantity)
        .await?;
    Ok(Json(lines.into()))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
    Path(item_id): Path<String>,
    Json(body): Json<UpdateItemRequest>,
) -> ApiResult<Json<CartResponse>> {
    let lines = state
        .carts
        .update_quantity(&client_id, &item_id, body.quantity)
        .await?;
    Ok(Json(lines.into()))
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
    Path(item_id): Path<String>,
) -> ApiResult<Json<CartResponse>> {
    Ok(Json(state.carts.remove_item(&client_id, &item_id).await?.into()))
}

async fn clear_cart(State(state): State<Arc<AppState>>, ClientId(client_id): ClientId) -> ApiResult<Json<ClearResponse>> {
    let removed = state.carts.clear(&client_id).await?;
    Ok(Json(ClearResponse { removed }))
}

/// Creates the Pending order and payment, answering with the hosted page.
async fn checkout(
    State(state): State<Arc<AppState>>,
    ClientId(client_id): ClientId,
) -> ApiResult<(StatusCode, Json<CheckoutReceipt>)> {
    let receipt = state.checkout.checkout_cart(&client_id).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
