//! Product catalog API handlers.
//!
//! DELETE deactivates rather than removes: invoice lines keep their
//! product reference and the product just leaves the catalog listing.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use billing_core::Product;
use billing_db::{NewProduct, ProductUpdate};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.db.products().list().await?))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().get_by_id(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().create(input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().update(id, input).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.db.products().deactivate(id).await?;
    Ok(Json(json!({ "success": true })))
}
