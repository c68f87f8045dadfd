use std::sync::Arc;

use common::{error::AppError, storage::db::SurrealDbClient, utils::config::AppConfig};
use learning_pipeline::LearnPipeline;

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub config: AppConfig,
    pub pipeline: Arc<LearnPipeline>,
}

impl ApiState {
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let db = Arc::new(
            SurrealDbClient::new(
                &config.surrealdb_address,
                &config.surrealdb_username,
                &config.surrealdb_password,
                &config.surrealdb_namespace,
                &config.surrealdb_database,
            )
            .await?,
        );

        db.ensure_initialized().await?;

        Self::with_db(db, config.clone())
    }

    /// Builds the state over an existing client; the entry point for tests
    /// running against an in-memory database.
    pub fn with_db(db: Arc<SurrealDbClient>, config: AppConfig) -> Result<Self, AppError> {
        let pipeline = Arc::new(LearnPipeline::new(Arc::clone(&db), config.clone())?);

        Ok(Self {
            db,
            config,
            pipeline,
        })
    }
}
