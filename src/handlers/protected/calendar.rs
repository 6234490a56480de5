use axum::{extract::State, Json};
use serde_json::Value;

use crate::auth::extract::{Admin, Authenticated};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /calendar - list calendar events, any authenticated caller
pub async fn list(State(state): State<AppState>, Authenticated(_): Authenticated) -> ApiResult<Value> {
    let rows = state.store.select("calendar", &[]).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /calendar - insert or update an event, admin only
pub async fn upsert(
    State(state): State<AppState>,
    Admin(_): Admin,
    Json(event): Json<Value>,
) -> ApiResult<Value> {
    let rows = state.store.upsert("calendar", event).await?;
    Ok(ApiResponse::success(rows))
}
