use axum::{extract::State, Json};
use serde_json::Value;

use crate::auth::extract::{Admin, Authenticated};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /exams - list exams, any authenticated caller
pub async fn list(State(state): State<AppState>, Authenticated(_): Authenticated) -> ApiResult<Value> {
    let rows = state.store.select("exams", &[]).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /exams - insert or update an exam, admin only
pub async fn upsert(
    State(state): State<AppState>,
    Admin(_): Admin,
    Json(exam): Json<Value>,
) -> ApiResult<Value> {
    let rows = state.store.upsert("exams", exam).await?;
    Ok(ApiResponse::success(rows))
}
