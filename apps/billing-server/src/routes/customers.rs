//! Customer API handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use billing_core::Customer;
use billing_db::{CustomerUpdate, NewCustomer};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.db.customers().list().await?))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.db.customers().get_by_id(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewCustomer>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.db.customers().create(input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CustomerUpdate>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.db.customers().update(id, input).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.db.customers().delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
