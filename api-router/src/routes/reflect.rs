use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use common::storage::types::vocabulary_entry::VocabularyEntry;
use serde::Serialize;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct TopicSuggestion {
    pub topic: String,
    pub term_count: usize,
    pub suggestion: String,
}

#[derive(Debug, Serialize)]
pub struct ReflectResponse {
    pub message: String,
    pub suggestions: Vec<TopicSuggestion>,
}

/// Reviews the lexicon grouped by originating topic and proposes follow-up
/// searches, giving an external scheduler broader seeds than the single
/// per-cycle suggestion.
pub async fn reflect(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let grouped = VocabularyEntry::grouped_by_topic(&state.db).await?;

    let suggestions = grouped
        .into_iter()
        .map(|count| TopicSuggestion {
            suggestion: format!(
                "search the encyclopedia for \"{} meaning, usage, context\"",
                count.related_topic
            ),
            topic: count.related_topic,
            term_count: count.term_count,
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(ReflectResponse {
            message: "reflection complete".to_string(),
            suggestions,
        }),
    ))
}
