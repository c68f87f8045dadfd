use std::collections::HashSet;

use common::{
    error::AppError,
    storage::types::{
        pending_topic::PendingTopic, relation::Relation, vocabulary_entry::VocabularyEntry,
    },
    text,
};
use state_machines::core::GuardError;
use tracing::{debug, info, instrument, warn};

use super::{
    context::CycleContext,
    state::{
        Extracted, Fetched, GraphUpdated, LearnMachine, QueueUpdated, Ready, TopicSelected,
        VocabPersisted,
    },
};

fn map_guard_error(event: &str, guard: &GuardError) -> AppError {
    AppError::InternalError(format!("learn machine rejected '{event}': {guard:?}"))
}

/// Validates and records the selected topic.
#[instrument(level = "trace", skip_all, fields(cycle_id = %ctx.cycle_id, topic = %ctx.topic))]
pub fn select_topic(
    machine: LearnMachine<(), Ready>,
    ctx: &mut CycleContext<'_>,
) -> Result<LearnMachine<(), TopicSelected>, AppError> {
    if ctx.normalized_topic.is_empty() {
        return Err(AppError::Validation(
            "topic normalizes to an empty string".into(),
        ));
    }

    info!(
        cycle_id = %ctx.cycle_id,
        topic = %ctx.topic,
        normalized = %ctx.normalized_topic,
        source = ?ctx.source,
        "topic selected"
    );

    machine
        .select()
        .map_err(|(_, guard)| map_guard_error("select", &guard))
}

/// Fetches the summary extract. `Ok(None)` means the topic has no summary;
/// nothing has been persisted and the queue is untouched at this point.
#[instrument(level = "trace", skip_all, fields(cycle_id = %ctx.cycle_id, topic = %ctx.topic))]
pub async fn fetch_summary(
    machine: LearnMachine<(), TopicSelected>,
    ctx: &mut CycleContext<'_>,
) -> Result<Option<LearnMachine<(), Fetched>>, AppError> {
    let Some(extract) = ctx.services.fetch_summary(&ctx.topic).await? else {
        info!(cycle_id = %ctx.cycle_id, topic = %ctx.topic, "no summary for topic");
        return Ok(None);
    };

    debug!(
        cycle_id = %ctx.cycle_id,
        topic = %ctx.topic,
        extract_chars = extract.chars().count(),
        "summary fetched"
    );
    ctx.extract = Some(extract);

    machine
        .fetch()
        .map(Some)
        .map_err(|(_, guard)| map_guard_error("fetch", &guard))
}

/// Runs the tagger over the fetched extract. Tagger failure aborts the
/// cycle; there is no partial extraction.
#[instrument(level = "trace", skip_all, fields(cycle_id = %ctx.cycle_id, topic = %ctx.topic))]
pub async fn extract_terms(
    machine: LearnMachine<(), Fetched>,
    ctx: &mut CycleContext<'_>,
) -> Result<LearnMachine<(), Extracted>, AppError> {
    let extract = ctx.extract()?;
    let tagged = ctx.services.extract_terms(extract).await?;

    debug!(
        cycle_id = %ctx.cycle_id,
        topic = %ctx.topic,
        token_count = tagged.len(),
        "terms extracted"
    );
    ctx.tagged = tagged;

    machine
        .extract()
        .map_err(|(_, guard)| map_guard_error("extract", &guard))
}

/// Normalizes, filters and persists candidate terms. Dedup happens three
/// ways: within the batch, against the lexicon via the exists check, and at
/// the store through the unique index (concurrent writers). The number of
/// newly inserted terms is capped by `max_terms_per_cycle` since the graph
/// stage is quadratic over them.
#[instrument(level = "trace", skip_all, fields(cycle_id = %ctx.cycle_id, topic = %ctx.topic))]
pub async fn persist_vocabulary(
    machine: LearnMachine<(), Extracted>,
    ctx: &mut CycleContext<'_>,
) -> Result<LearnMachine<(), VocabPersisted>, AppError> {
    let extract = ctx.extract()?.to_string();
    let mut seen: HashSet<String> = HashSet::new();
    let mut batch_terms: Vec<String> = Vec::new();
    let mut new_terms: Vec<String> = Vec::new();

    for tagged in &ctx.tagged {
        if batch_terms.len() >= ctx.config.max_terms_per_cycle {
            debug!(
                cycle_id = %ctx.cycle_id,
                cap = ctx.config.max_terms_per_cycle,
                "term cap reached; remaining tokens skipped"
            );
            break;
        }

        if !text::is_acceptable(&tagged.text, &ctx.normalized_topic) {
            continue;
        }

        let normalized = text::normalize(&tagged.text);
        if !seen.insert(normalized.clone()) {
            continue;
        }
        batch_terms.push(normalized.clone());

        if VocabularyEntry::exists(&normalized, ctx.db).await? {
            continue;
        }

        let entry = VocabularyEntry::new(
            normalized.clone(),
            tagged.tag.clone(),
            extract.clone(),
            ctx.normalized_topic.clone(),
            ctx.config.language.clone(),
        );
        if entry.insert_if_new(ctx.db).await? {
            new_terms.push(normalized);
        }
    }

    info!(
        cycle_id = %ctx.cycle_id,
        topic = %ctx.topic,
        batch_terms = batch_terms.len(),
        new_terms = new_terms.len(),
        "vocabulary persisted"
    );
    ctx.batch_terms = batch_terms;
    ctx.new_terms = new_terms;

    machine
        .persist_vocab()
        .map_err(|(_, guard)| map_guard_error("persist_vocab", &guard))
}

/// Reinforces the co-occurrence edge for every unordered pair of accepted
/// terms in this extract: C(N,2) store calls, the dominant cost of a large
/// cycle. Known terms participate too, so re-ingesting a topic strengthens
/// its edges instead of leaving them flat. A failed pair is logged and
/// skipped; partial graph enrichment beats aborting the whole batch.
#[instrument(level = "trace", skip_all, fields(cycle_id = %ctx.cycle_id, topic = %ctx.topic))]
pub async fn update_graph(
    machine: LearnMachine<(), VocabPersisted>,
    ctx: &mut CycleContext<'_>,
) -> Result<LearnMachine<(), GraphUpdated>, AppError> {
    let mut reinforced = 0_usize;
    let mut failed = 0_usize;

    for (i, term_a) in ctx.batch_terms.iter().enumerate() {
        for term_b in ctx.batch_terms.iter().skip(i.saturating_add(1)) {
            match Relation::reinforce(term_a, term_b, 1, &ctx.normalized_topic, ctx.db).await {
                Ok(()) => reinforced = reinforced.saturating_add(1),
                Err(err) => {
                    failed = failed.saturating_add(1);
                    warn!(
                        cycle_id = %ctx.cycle_id,
                        term_a = %term_a,
                        term_b = %term_b,
                        error = %err,
                        "failed to reinforce relation; continuing batch"
                    );
                }
            }
        }
    }

    debug!(
        cycle_id = %ctx.cycle_id,
        reinforced,
        failed,
        "graph updated"
    );

    machine
        .update_graph()
        .map_err(|(_, guard)| map_guard_error("update_graph", &guard))
}

/// Enqueues every newly learned term for its own future cycle and removes
/// the processed topic from the pending queue. The dequeue runs even for
/// explicitly supplied topics, in case the same term was also queued.
#[instrument(level = "trace", skip_all, fields(cycle_id = %ctx.cycle_id, topic = %ctx.topic))]
pub async fn update_queue(
    machine: LearnMachine<(), GraphUpdated>,
    ctx: &mut CycleContext<'_>,
) -> Result<LearnMachine<(), QueueUpdated>, AppError> {
    for term in &ctx.new_terms {
        PendingTopic::enqueue(term, ctx.db).await?;
    }
    PendingTopic::dequeue(&ctx.normalized_topic, ctx.db).await?;

    debug!(
        cycle_id = %ctx.cycle_id,
        enqueued = ctx.new_terms.len(),
        dequeued = %ctx.normalized_topic,
        "queue updated"
    );

    machine
        .update_queue()
        .map_err(|(_, guard)| map_guard_error("update_queue", &guard))
}
