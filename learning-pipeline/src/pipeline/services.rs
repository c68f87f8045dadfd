use async_trait::async_trait;
use common::{error::AppError, utils::config::AppConfig};

use crate::{
    tagger::{HeuristicTagger, TaggedTerm, TermTagger},
    wikipedia::WikipediaSummaryClient,
};

/// The two external collaborators one learning cycle depends on. Kept
/// behind a trait so tests can run the full pipeline against canned
/// summaries and taggers.
#[async_trait]
pub trait PipelineServices: Send + Sync {
    /// `Ok(None)` means the topic has no summary (a terminal not-found for
    /// this topic, not a transport failure).
    async fn fetch_summary(&self, topic: &str) -> Result<Option<String>, AppError>;

    /// Tokenizes and tags the fetched text. Failure is fatal for the cycle;
    /// there is no partial extraction.
    async fn extract_terms(&self, text: &str) -> Result<Vec<TaggedTerm>, AppError>;
}

pub struct DefaultPipelineServices {
    summaries: WikipediaSummaryClient,
    tagger: HeuristicTagger,
}

impl DefaultPipelineServices {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            summaries: WikipediaSummaryClient::new(&config.summary_api_base)?,
            tagger: HeuristicTagger,
        })
    }
}

#[async_trait]
impl PipelineServices for DefaultPipelineServices {
    async fn fetch_summary(&self, topic: &str) -> Result<Option<String>, AppError> {
        self.summaries.fetch_extract(topic).await
    }

    async fn extract_terms(&self, text: &str) -> Result<Vec<TaggedTerm>, AppError> {
        self.tagger.tag(text)
    }
}
