use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnStatus {
    /// A topic was ingested and the graph updated.
    Ok,
    /// The queue was empty and no topic was supplied; nothing left to learn.
    Done,
    /// The selected topic has no summary.
    NotFound,
}

/// Result summary of one ingestion cycle, returned to the caller and
/// serialized as the HTTP response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnOutcome {
    pub status: LearnStatus,
    pub message: String,
    pub word_count: usize,
    /// One newly learned term, offered as the seed for the next cycle so an
    /// external scheduler can chain calls without its own topic selection.
    pub suggestion: Option<String>,
    pub topic: Option<String>,
}

impl LearnOutcome {
    pub fn learned(topic: &str, new_terms: &[String]) -> Self {
        Self {
            status: LearnStatus::Ok,
            message: format!("learned {} new terms about '{topic}'", new_terms.len()),
            word_count: new_terms.len(),
            suggestion: new_terms.first().cloned(),
            topic: Some(topic.to_string()),
        }
    }

    pub fn queue_drained() -> Self {
        Self {
            status: LearnStatus::Done,
            message: "no pending topics".to_string(),
            word_count: 0,
            suggestion: None,
            topic: None,
        }
    }

    pub fn not_found(topic: &str) -> Self {
        Self {
            status: LearnStatus::NotFound,
            message: format!("no summary found for '{topic}'"),
            word_count: 0,
            suggestion: None,
            topic: Some(topic.to_string()),
        }
    }
}
