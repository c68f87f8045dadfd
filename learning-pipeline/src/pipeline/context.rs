use common::{error::AppError, storage::db::SurrealDbClient, text, utils::config::AppConfig};
use tracing::error;
use uuid::Uuid;

use crate::tagger::TaggedTerm;

use super::services::PipelineServices;

/// Where the cycle's topic came from; explicit topics are exempt from the
/// multi-candidate fetch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicSource {
    Explicit,
    Queue,
}

pub struct CycleContext<'a> {
    pub cycle_id: String,
    /// Topic as supplied, used for the summary fetch.
    pub topic: String,
    /// Canonical form used for self-reference checks and queue keys.
    pub normalized_topic: String,
    pub source: TopicSource,
    pub db: &'a SurrealDbClient,
    pub config: &'a AppConfig,
    pub services: &'a dyn PipelineServices,
    pub extract: Option<String>,
    pub tagged: Vec<TaggedTerm>,
    /// All accepted, deduplicated terms from this extract (capped). Graph
    /// reinforcement runs over this set so re-observing a known pair still
    /// strengthens its edge.
    pub batch_terms: Vec<String>,
    /// The subset of `batch_terms` that was newly inserted this cycle;
    /// drives queue updates and the result summary.
    pub new_terms: Vec<String>,
}

impl<'a> CycleContext<'a> {
    pub fn new(
        topic: &str,
        source: TopicSource,
        db: &'a SurrealDbClient,
        config: &'a AppConfig,
        services: &'a dyn PipelineServices,
    ) -> Self {
        Self {
            cycle_id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            normalized_topic: text::normalize(topic),
            source,
            db,
            config,
            services,
            extract: None,
            tagged: Vec::new(),
            batch_terms: Vec::new(),
            new_terms: Vec::new(),
        }
    }

    pub fn extract(&self) -> Result<&str, AppError> {
        self.extract
            .as_deref()
            .ok_or_else(|| AppError::InternalError("summary extract expected to be available".into()))
    }

    pub fn abort(&mut self, err: AppError) -> AppError {
        error!(
            cycle_id = %self.cycle_id,
            topic = %self.topic,
            error = %err,
            "learning cycle aborted"
        );
        err
    }
}
