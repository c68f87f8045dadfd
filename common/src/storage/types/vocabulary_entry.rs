use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};
use uuid::Uuid;

/// Sentinel tag recorded when the tagger could not classify a term.
pub const UNKNOWN_POS: &str = "unknown";

stored_object!(VocabularyEntry, "lexicon", {
    term: String,
    part_of_speech: String,
    example_usage: String,
    related_topic: String,
    language: String
});

/// Per-topic aggregate over the lexicon, used for reflection suggestions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct TopicTermCount {
    pub related_topic: String,
    pub term_count: usize,
}

impl VocabularyEntry {
    pub fn new(
        term: String,
        part_of_speech: Option<String>,
        example_usage: String,
        related_topic: String,
        language: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            term,
            part_of_speech: part_of_speech.unwrap_or_else(|| UNKNOWN_POS.to_string()),
            example_usage,
            related_topic,
            language,
        }
    }

    /// Read-only existence check by normalized term. Selects the raw id
    /// string rather than the record, since a `Thing` id does not
    /// deserialize into plain JSON.
    pub async fn exists(term: &str, db: &SurrealDbClient) -> Result<bool, AppError> {
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

    /// Inserts the entry unless its term is already in the lexicon.
    ///
    /// Returns whether a row was written. A unique-index conflict from a
    /// concurrent writer is reported as `Ok(false)`; the invariant is one
    /// row per term, not that this caller wrote it.
    pub async fn insert_if_new(self, db: &SurrealDbClient) -> Result<bool, AppError> {
        if Self::exists(&self.term, db).await? {
            return Ok(false);
        }

        match db.store_item(self).await {
            Ok(_) => Ok(true),
            Err(surrealdb::Error::Db(surrealdb::error::Db::IndexExists { .. })) => Ok(false),
            Err(surrealdb::Error::Db(surrealdb::error::Db::RecordExists { .. })) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn count_for_term(term: &str, db: &SurrealDbClient) -> Result<usize, AppError> {
        let mut result = db
            .client
            .query("SELECT VALUE record::id(id) FROM type::table($table) WHERE term = $term")
            .bind(("table", Self::table_name()))
            .bind(("term", term.to_string()))
            .await?;
        let rows: Vec<String> = result.take(0)?;
        Ok(rows.len())
    }

    /// Groups the lexicon by the topic that produced each term.
    pub async fn grouped_by_topic(db: &SurrealDbClient) -> Result<Vec<TopicTermCount>, AppError> {
        let mut result = db
            .client
            .query(
                "SELECT related_topic, count() AS term_count FROM type::table($table) GROUP BY related_topic",
            )
            .bind(("table", Self::table_name()))
            .await?;
        let counts: Vec<TopicTermCount> = result.take(0)?;
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(term: &str, topic: &str) -> VocabularyEntry {
        VocabularyEntry::new(
            term.to_string(),
            Some("noun".to_string()),
            format!("Un {term} aparece en el extracto."),
            topic.to_string(),
            "es".to_string(),
        )
    }

    async fn memory_db() -> SurrealDbClient {
        let db = SurrealDbClient::memory("test_ns", &Uuid::new_v4().to_string())
            .await
            .expect("Failed to start in-memory surrealdb");
        db.ensure_initialized()
            .await
            .expect("Failed to initialize schema");
        db
    }

    #[test]
    fn unknown_tag_is_the_default() {
        let entry = VocabularyEntry::new(
            "mamífero".to_string(),
            None,
            "texto".to_string(),
            "gato".to_string(),
            "es".to_string(),
        );
        assert_eq!(entry.part_of_speech, UNKNOWN_POS);
        assert!(!entry.id.is_empty());
    }

    #[tokio::test]
    async fn insert_then_exists() {
        let db = memory_db().await;

        assert!(!VocabularyEntry::exists("mamífero", &db).await.unwrap());
        assert!(entry("mamífero", "gato")
            .insert_if_new(&db)
            .await
            .expect("insert failed"));
        assert!(VocabularyEntry::exists("mamífero", &db).await.unwrap());
    }

    #[tokio::test]
    async fn exists_reads_back_from_an_occupied_table() {
        let db = memory_db().await;
        entry("mamífero", "gato").insert_if_new(&db).await.unwrap();

        // The lookup must hit the stored row, not choke on its record id.
        assert!(VocabularyEntry::exists("mamífero", &db).await.unwrap());
        assert!(!VocabularyEntry::exists("doméstico", &db).await.unwrap());
        assert_eq!(
            VocabularyEntry::count_for_term("mamífero", &db).await.unwrap(),
            1
        );
        assert_eq!(
            VocabularyEntry::count_for_term("doméstico", &db).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_noop() {
        let db = memory_db().await;

        assert!(entry("mamífero", "gato").insert_if_new(&db).await.unwrap());
        // Second insert of the same term reports nothing written.
        assert!(!entry("mamífero", "perro").insert_if_new(&db).await.unwrap());

        let count = VocabularyEntry::count_for_term("mamífero", &db)
            .await
            .unwrap();
        assert_eq!(count, 1, "exactly one row per normalized term");
    }

    #[tokio::test]
    async fn grouping_counts_terms_per_topic() {
        let db = memory_db().await;

        entry("mamífero", "gato").insert_if_new(&db).await.unwrap();
        entry("doméstico", "gato").insert_if_new(&db).await.unwrap();
        entry("ladrido", "perro").insert_if_new(&db).await.unwrap();

        let mut grouped = VocabularyEntry::grouped_by_topic(&db).await.unwrap();
        grouped.sort_by(|a, b| a.related_topic.cmp(&b.related_topic));

        assert_eq!(
            grouped,
            vec![
                TopicTermCount {
                    related_topic: "gato".to_string(),
                    term_count: 2
                },
                TopicTermCount {
                    related_topic: "perro".to_string(),
                    term_count: 1
                },
            ]
        );
    }
}
