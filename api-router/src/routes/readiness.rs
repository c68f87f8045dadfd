use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::api_state::ApiState;

/// Readiness probe: 200 once the lexicon store answers a trivial query,
/// 503 while it does not. A cycle cannot persist anything without the
/// store, so nothing else is worth checking.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    match state.db.client.query("RETURN true").await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "surrealdb": "ok" }
            })),
        ),
        Err(e) => {
            warn!(error = %e, "readiness check failed against the lexicon store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "checks": { "surrealdb": "fail" },
                    "reason": e.to_string()
                })),
            )
        }
    }
}
