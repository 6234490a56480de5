use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod supabase;

#[cfg(test)]
pub mod testing;

use state::AppState;

/// Build the full router. Every business route sits behind the authenticate
/// layer; only the credential-minting routes and the service banner are open.
pub fn app(state: AppState) -> Router {
    let gated = Router::new()
        .merge(exam_routes())
        .merge(calendar_routes())
        .merge(pyq_routes())
        .merge(file_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (token acquisition)
        .merge(auth_public_routes())
        // Gated relays
        .merge(gated)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
}

fn exam_routes() -> Router<AppState> {
    use handlers::protected::exams;

    Router::new().route("/exams", get(exams::list).post(exams::upsert))
}

fn calendar_routes() -> Router<AppState> {
    use handlers::protected::calendar;

    Router::new().route("/calendar", get(calendar::list).post(calendar::upsert))
}

fn pyq_routes() -> Router<AppState> {
    use handlers::protected::pyqs;

    Router::new().route("/pyqs", get(pyqs::list).post(pyqs::upsert))
}

fn file_routes() -> Router<AppState> {
    use handlers::protected::files;

    Router::new()
        .route("/files/upload", post(files::upload))
        .route("/files/download/:file_id", get(files::download))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Gradient API",
            "version": version,
            "status": "running",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/login, /auth/signup (public - token acquisition)",
                "exams": "/exams (GET authenticated, POST admin)",
                "calendar": "/calendar (GET authenticated, POST admin)",
                "pyqs": "/pyqs (GET authenticated, POST admin)",
                "files": "/files/upload (POST admin), /files/download/:file_id (GET authenticated)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.probe().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "upstream": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "upstream unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "upstream_error": e.to_string()
                }
            })),
        ),
    }
}
