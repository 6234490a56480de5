// handlers/public/auth.rs - credential-minting routes
//
// Exempt from the access gate: these endpoints produce the tokens the gate
// later verifies. All password handling lives in the identity provider.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - exchange email/password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<Value> {
    let session = state.identity.sign_in(&req.email, &req.password).await?;

    let token = session
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            tracing::error!("identity provider session is missing access_token");
            ApiError::bad_gateway("identity provider error")
        })?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": session.get("user").cloned().unwrap_or(Value::Null),
    })))
}

/// POST /auth/signup - register a new account with the identity provider
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<Value> {
    let user = state.identity.sign_up(&req.email, &req.password).await?;
    Ok(ApiResponse::success(user))
}
