use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::state::AppState;

/// Authentication middleware applied to every gated route.
///
/// Extracts the bearer credential, verifies it through the access gate, and
/// stores the resulting `Claims` on the request for route extractors. Any
/// failure ends the request here; the handler and its upstream call never run.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    let claims = state.gate.authenticate(token)?;

    tracing::debug!(sub = %claims.sub, role = %claims.role, "request authenticated");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Pull the token out of the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get("authorization")
        .ok_or(AuthError::MissingCredential)?;

    let value = header
        .to_str()
        .map_err(|_| AuthError::Malformed("authorization header is not valid UTF-8".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::Malformed("authorization header must use Bearer scheme".to_string()))?;

    if token.trim().is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}
