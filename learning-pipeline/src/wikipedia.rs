use common::error::AppError;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

/// Response shape of the REST summary endpoint; only the extract matters.
#[derive(Debug, Deserialize)]
struct SummaryResponse {
    extract: Option<String>,
}

/// Client for the Wikipedia REST `page/summary` endpoint. The base URL
/// carries the locale (`https://es.wikipedia.org/...` by default), so the
/// same client shape serves any language edition.
#[derive(Debug, Clone)]
pub struct WikipediaSummaryClient {
    http: reqwest::Client,
    base: Url,
}

impl WikipediaSummaryClient {
    pub fn new(base: &str) -> Result<Self, AppError> {
        let base = Url::parse(base)
            .map_err(|e| AppError::Validation(format!("invalid summary API base URL: {e}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// Builds the summary URL for a topic, percent-encoding the topic as a
    /// single path segment.
    fn summary_url(&self, topic: &str) -> Result<Url, AppError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Validation("summary API base cannot be a base URL".into()))?
            .push(topic);
        Ok(url)
    }

    /// Fetches the summary extract for a topic. `Ok(None)` means the topic
    /// has no article (or an article with no extract); transport failures
    /// and non-404 error statuses surface as upstream errors.
    pub async fn fetch_extract(&self, topic: &str) -> Result<Option<String>, AppError> {
        let url = self.summary_url(topic)?;
        debug!(%url, topic, "fetching summary");

        let response = self.http.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            warn!(topic, status = %response.status(), "summary provider returned an error status");
            return Err(AppError::Upstream(format!(
                "summary provider returned {} for '{topic}'",
                response.status()
            )));
        }

        let summary: SummaryResponse = response.json().await?;
        Ok(summary.extract.filter(|extract| !extract.trim().is_empty()))
    }
}
