use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use learning_pipeline::LearnStatus;
use serde::Deserialize;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LearnParams {
    /// Seed topic for this cycle; when absent the oldest pending topic is
    /// taken from the queue.
    pub topic: Option<String>,
}

/// Triggers one ingestion cycle. 200 for a completed cycle or an empty
/// queue, 404 when the selected topic has no summary, 500 for upstream or
/// store failures.
pub async fn learn(
    State(state): State<ApiState>,
    Query(params): Query<LearnParams>,
) -> Result<impl IntoResponse, ApiError> {
    info!(topic = params.topic.as_deref(), "learn cycle requested");

    let outcome = state.pipeline.run_cycle(params.topic).await?;

    let status = match outcome.status {
        LearnStatus::NotFound => StatusCode::NOT_FOUND,
        LearnStatus::Ok | LearnStatus::Done => StatusCode::OK,
    };

    Ok((status, Json(outcome)))
}
