use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::extract::{Admin, Authenticated};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Optional equality filters for the past-year question paper listing.
#[derive(Debug, Default, Deserialize)]
pub struct PyqQuery {
    pub subject: Option<String>,
    pub year: Option<i32>,
    pub difficulty: Option<String>,
}

impl PyqQuery {
    fn into_filters(self) -> Vec<(String, String)> {
        let mut filters = Vec::new();
        if let Some(subject) = self.subject {
            filters.push(("subject".to_string(), subject));
        }
        if let Some(year) = self.year {
            filters.push(("year".to_string(), year.to_string()));
        }
        if let Some(difficulty) = self.difficulty {
            filters.push(("difficulty".to_string(), difficulty));
        }
        filters
    }
}

/// GET /pyqs - list question papers, optionally narrowed by subject, year,
/// and difficulty; any authenticated caller
pub async fn list(
    State(state): State<AppState>,
    Authenticated(_): Authenticated,
    Query(query): Query<PyqQuery>,
) -> ApiResult<Value> {
    let rows = state.store.select("pyqs", &query.into_filters()).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /pyqs - insert or update a question paper, admin only
pub async fn upsert(
    State(state): State<AppState>,
    Admin(_): Admin,
    Json(pyq): Json<Value>,
) -> ApiResult<Value> {
    let rows = state.store.upsert("pyqs", pyq).await?;
    Ok(ApiResponse::success(rows))
}
