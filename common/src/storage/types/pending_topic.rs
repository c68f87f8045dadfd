use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};
use uuid::Uuid;

stored_object!(PendingTopic, "pendientes", {
    term: String
});

impl PendingTopic {
    pub fn new(term: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            term,
        }
    }

    /// Returns the oldest pending topic, or `None` when the queue is empty.
    /// An empty queue is the terminal "nothing left to learn" condition,
    /// not an error.
    pub async fn next(db: &SurrealDbClient) -> Result<Option<PendingTopic>, AppError> {
        let mut result = db
            .client
            .query("SELECT * FROM type::table($table) ORDER BY created_at ASC LIMIT 1")
            .bind(("table", Self::table_name()))
            .await?;
        let oldest: Option<PendingTopic> = result.take(0)?;
        Ok(oldest)
    }

    /// Idempotent upsert keyed by normalized term. Re-enqueueing a term
    /// that is already pending leaves the queue unchanged, preserving the
    /// original position in FIFO order.
    pub async fn enqueue(term: &str, db: &SurrealDbClient) -> Result<(), AppError> {
        if Self::contains(term, db).await? {
            return Ok(());
        }

        match db.store_item(Self::new(term.to_string())).await {
            Ok(_) => Ok(()),
            Err(surrealdb::Error::Db(surrealdb::error::Db::IndexExists { .. })) => Ok(()),
            Err(surrealdb::Error::Db(surrealdb::error::Db::RecordExists { .. })) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the pending row for `term` if present; a no-op otherwise.
    /// Topics supplied explicitly by a caller were never queued, but still
    /// get dequeued at cycle end to guard against reprocessing.
    pub async fn dequeue(term: &str, db: &SurrealDbClient) -> Result<(), AppError> {
        db.client
            .query("DELETE type::table($table) WHERE term = $term")
            .bind(("table", Self::table_name()))
            .bind(("term", term.to_string()))
            .await?;
        Ok(())
    }

    /// Whether a pending row for `term` exists. Selects the raw id string
    /// rather than the record, since a `Thing` id does not deserialize into
    /// plain JSON.
    pub async fn contains(term: &str, db: &SurrealDbClient) -> Result<bool, AppError> {
        let mut result = db
            .client
            .query(
                "SELECT VALUE record::id(id) FROM type::table($table) WHERE term = $term LIMIT 1",
            )
            .bind(("table", Self::table_name()))
            .bind(("term", term.to_string()))
            .await?;
        let found: Vec<String> = result.take(0)?;
        Ok(!found.is_empty())
    }
}
