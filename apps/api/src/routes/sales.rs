//! Direct sales and the admin statistics.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::identity::UserId;
use crate::state::AppState;
use smartsales_core::{Sale, SalesStats};

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/stats", get(stats))
        .route("/sales/{sale_id}", delete(delete_sale))
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub client_id: String,
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

async fn list_sales(
    State(state): State<Arc<AppState>>,
    _user: UserId,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    Ok(Json(state.db.sales().list_recent(limit).await?))
}

async fn create_sale(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Json(body): Json<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let sale = state
        .sales
        .create_direct_sale(Some(&user_id), &body.client_id, &body.product_id, body.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// Returns the units to stock.
async fn delete_sale(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(sale_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.sales.delete_sale(Some(&user_id), &sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stats(State(state): State<Arc<AppState>>, _user: UserId) -> ApiResult<Json<SalesStats>> {
    Ok(Json(state.sales.stats().await?))
}
