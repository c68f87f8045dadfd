#![allow(clippy::missing_docs_in_private_items)]

use api_state::ApiState;
use axum::{
    extract::FromRef,
    routing::get,
    Router,
};
use routes::{learn::learn, liveness::live, readiness::ready, reflect::reflect};

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Probes for k8s/systemd, plus the learning trigger and reflection.
    Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live))
        .route("/learn", get(learn).post(learn))
        .route("/reflect", get(reflect))
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use async_trait::async_trait;
    use axum::{body::Body, http::Request, http::StatusCode};
    use common::{
        error::AppError,
        storage::{db::SurrealDbClient, types::pending_topic::PendingTopic},
        utils::config::AppConfig,
    };
    use learning_pipeline::{
        pipeline::PipelineServices,
        tagger::{HeuristicTagger, TaggedTerm, TermTagger},
        LearnPipeline,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;

    struct CannedServices {
        summaries: HashMap<String, String>,
    }

    #[async_trait]
    impl PipelineServices for CannedServices {
        async fn fetch_summary(&self, topic: &str) -> Result<Option<String>, AppError> {
            Ok(self.summaries.get(topic).cloned())
        }

        async fn extract_terms(&self, text: &str) -> Result<Vec<TaggedTerm>, AppError> {
            HeuristicTagger.tag(text)
        }
    }

    fn test_config() -> AppConfig {
        AppConfig {
            surrealdb_address: "mem://".into(),
            surrealdb_username: "root".into(),
            surrealdb_password: "root".into(),
            surrealdb_namespace: "test_ns".into(),
            surrealdb_database: "test_db".into(),
            http_port: 0,
            summary_api_base: "https://es.wikipedia.org/api/rest_v1/page/summary".into(),
            language: "es".into(),
            max_terms_per_cycle: 24,
            max_fetch_candidates: 3,
        }
    }

    async fn test_state(summaries: &[(&str, &str)]) -> ApiState {
        let db = Arc::new(
            SurrealDbClient::memory("test_ns", &Uuid::new_v4().to_string())
                .await
                .expect("failed to start in-memory surrealdb"),
        );
        db.ensure_initialized()
            .await
            .expect("failed to initialize schema");

        let config = test_config();
        let services = Arc::new(CannedServices {
            summaries: summaries
                .iter()
                .map(|(t, s)| ((*t).to_string(), (*s).to_string()))
                .collect(),
        });
        let pipeline = Arc::new(LearnPipeline::with_services(
            Arc::clone(&db),
            config.clone(),
            services,
        ));

        ApiState {
            db,
            config,
            pipeline,
        }
    }

    fn router(state: ApiState) -> Router {
        api_routes_v1().with_state(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn probes_respond_ok() {
        let app = router(test_state(&[]).await);

        let live = app
            .clone()
            .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(live.status(), StatusCode::OK);
        let json = body_json(live).await;
        assert_eq!(json["service"], "lexigraph");

        let ready = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ready.status(), StatusCode::OK);
        let json = body_json(ready).await;
        assert_eq!(json["checks"]["surrealdb"], "ok");
    }

    #[tokio::test]
    async fn learn_with_topic_returns_the_outcome() {
        let app = router(
            test_state(&[("Gato", "Un gato es un mamífero doméstico.")]).await,
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/learn?topic=Gato")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["word_count"], 2);
        assert_eq!(json["suggestion"], "mamífero");
    }

    #[tokio::test]
    async fn learn_unknown_topic_is_404() {
        let app = router(test_state(&[]).await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/learn?topic=Fantasma")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["status"], "not_found");
        assert_eq!(json["topic"], "Fantasma");
    }

    #[tokio::test]
    async fn learn_empty_queue_is_terminal_success() {
        let app = router(test_state(&[]).await);

        let response = app
            .oneshot(Request::builder().uri("/learn").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "done");
        assert_eq!(json["message"], "no pending topics");
    }

    #[tokio::test]
    async fn learn_without_topic_consumes_the_queue() {
        let state = test_state(&[("gato", "Un gato es un mamífero doméstico.")]).await;
        PendingTopic::enqueue("gato", &state.db).await.unwrap();
        let app = router(state);

        let response = app
            .oneshot(Request::builder().uri("/learn").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["topic"], "gato");
    }

    #[tokio::test]
    async fn reflect_lists_learned_topics() {
        let state = test_state(&[("Gato", "Un gato es un mamífero doméstico.")]).await;
        let app = router(state);

        let learn = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/learn?topic=Gato")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(learn.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/reflect")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let suggestions = json["suggestions"].as_array().expect("suggestions array");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0]["topic"], "gato");
        assert_eq!(suggestions[0]["term_count"], 2);
    }
}
