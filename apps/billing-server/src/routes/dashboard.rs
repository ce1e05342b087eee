//! Dashboard statistics and health handlers.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use billing_db::DashboardStats;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.db.stats().dashboard().await?))
}

/// Liveness probe: reports whether the database answers queries.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database_ok = state.db.health_check().await;
    Json(json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "database": database_ok,
    }))
}
