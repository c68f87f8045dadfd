use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};
use uuid::Uuid;

stored_object!(Relation, "conexiones", {
    term_a: String,
    term_b: String,
    strength: u32,
    context: String
});

impl Relation {
    /// Builds an edge with the canonical pair ordering applied: the
    /// lexicographically smaller term is always `term_a`, so (a, b) and
    /// (b, a) address the same undirected row.
    pub fn new(term_a: &str, term_b: &str, strength: u32, context: String) -> Self {
        let (first, second) = Self::canonical_pair(term_a, term_b);
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            term_a: first.to_string(),
            term_b: second.to_string(),
            strength,
            context,
        }
    }

    pub fn canonical_pair<'t>(a: &'t str, b: &'t str) -> (&'t str, &'t str) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Creates or strengthens the undirected edge between two co-occurring
    /// terms. An existing (pair, context) row has its strength incremented
    /// by `weight`; otherwise a new row starts at `weight`.
    ///
    /// Callers issue one call per unordered pair of a term batch, so a
    /// batch of N terms costs N*(N-1)/2 calls.
    pub async fn reinforce(
        term_a: &str,
        term_b: &str,
        weight: u32,
        context: &str,
        db: &SurrealDbClient,
    ) -> Result<(), AppError> {
        let (first, second) = Self::canonical_pair(term_a, term_b);

        let mut updated = db
            .client
            .query(
                "UPDATE type::table($table)
                SET strength += $weight,
                    updated_at = time::now()
                WHERE term_a = $term_a AND term_b = $term_b AND context = $context
                RETURN AFTER",
            )
            .bind(("table", Self::table_name()))
            .bind(("term_a", first.to_string()))
            .bind(("term_b", second.to_string()))
            .bind(("context", context.to_string()))
            .bind(("weight", weight))
            .await?;
        let strengthened: Vec<Relation> = updated.take(0)?;

        if strengthened.is_empty() {
            db.store_item(Self::new(first, second, weight, context.to_string()))
                .await?;
        }

        Ok(())
    }

    /// Current strength of the edge between two terms within `context`,
    /// if one has been observed.
    pub async fn strength_between(
        term_a: &str,
        term_b: &str,
        context: &str,
        db: &SurrealDbClient,
    ) -> Result<Option<u32>, AppError> {
        let (first, second) = Self::canonical_pair(term_a, term_b);

        let mut result = db
            .client
            .query(
                "SELECT * FROM type::table($table)
                WHERE term_a = $term_a AND term_b = $term_b AND context = $context",
            )
            .bind(("table", Self::table_name()))
            .bind(("term_a", first.to_string()))
            .bind(("term_b", second.to_string()))
            .bind(("context", context.to_string()))
            .await?;
        let rows: Vec<Relation> = result.take(0)?;
        Ok(rows.first().map(|r| r.strength))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn pair_ordering_is_canonical() {
        assert_eq!(Relation::canonical_pair("b", "a"), ("a", "b"));
        assert_eq!(Relation::canonical_pair("a", "b"), ("a", "b"));

        let edge = Relation::new("zorro", "ave", 1, "fauna".to_string());
        assert_eq!(edge.term_a, "ave");
        assert_eq!(edge.term_b, "zorro");
    }

    #[tokio::test]
    async fn first_observation_creates_the_edge() {
        let db = memory_db().await;

        Relation::reinforce("mamífero", "doméstico", 1, "gato", &db)
            .await
            .unwrap();

        let strength = Relation::strength_between("mamífero", "doméstico", "gato", &db)
            .await
            .unwrap();
        assert_eq!(strength, Some(1));
    }

    #[tokio::test]
    async fn reobservation_accumulates_strength() {
        let db = memory_db().await;

        Relation::reinforce("mamífero", "doméstico", 1, "gato", &db)
            .await
            .unwrap();
        Relation::reinforce("mamífero", "doméstico", 1, "gato", &db)
            .await
            .unwrap();
        Relation::reinforce("mamífero", "doméstico", 3, "gato", &db)
            .await
            .unwrap();

        let strength = Relation::strength_between("mamífero", "doméstico", "gato", &db)
            .await
            .unwrap();
        assert_eq!(strength, Some(5), "strength is the sum of observed weights");

        let all = db
            .get_all_stored_items::<Relation>()
            .await
            .expect("select failed");
        assert_eq!(all.len(), 1, "re-observation must not insert a second row");
    }

    #[tokio::test]
    async fn reversed_pair_addresses_the_same_edge() {
        let db = memory_db().await;

        Relation::reinforce("mamífero", "doméstico", 1, "gato", &db)
            .await
            .unwrap();
        Relation::reinforce("doméstico", "mamífero", 1, "gato", &db)
            .await
            .unwrap();

        let strength = Relation::strength_between("doméstico", "mamífero", "gato", &db)
            .await
            .unwrap();
        assert_eq!(strength, Some(2));

        let all = db
            .get_all_stored_items::<Relation>()
            .await
            .expect("select failed");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn contexts_are_separate_edges() {
        let db = memory_db().await;

        Relation::reinforce("mamífero", "doméstico", 1, "gato", &db)
            .await
            .unwrap();
        Relation::reinforce("mamífero", "doméstico", 1, "perro", &db)
            .await
            .unwrap();

        assert_eq!(
            Relation::strength_between("mamífero", "doméstico", "gato", &db)
                .await
                .unwrap(),
            Some(1)
        );
        assert_eq!(
            Relation::strength_between("mamífero", "doméstico", "perro", &db)
                .await
                .unwrap(),
            Some(1)
        );
    }
}
