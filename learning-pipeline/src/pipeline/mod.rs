mod context;
mod outcome;
mod services;
mod stages;
mod state;

pub use outcome::{LearnOutcome, LearnStatus};
#[allow(clippy::module_name_repetitions)]
pub use services::{DefaultPipelineServices, PipelineServices};

use std::{sync::Arc, time::Instant};

use common::{
    error::AppError,
    storage::{db::SurrealDbClient, types::pending_topic::PendingTopic},
    utils::config::AppConfig,
};
use tracing::{info, warn};

use self::{
    context::{CycleContext, TopicSource},
    stages::{
        extract_terms, fetch_summary, persist_vocabulary, select_topic, update_graph, update_queue,
    },
    state::ready,
};

/// Orchestrator for one topic-ingestion cycle: pick topic, fetch summary,
/// extract terms, persist vocabulary, update the relation graph, maintain
/// the pending queue, and report the result.
pub struct LearnPipeline {
    db: Arc<SurrealDbClient>,
    config: AppConfig,
    services: Arc<dyn PipelineServices>,
}

impl LearnPipeline {
    pub fn new(db: Arc<SurrealDbClient>, config: AppConfig) -> Result<Self, AppError> {
        let services = DefaultPipelineServices::new(&config)?;
        Ok(Self::with_services(db, config, Arc::new(services)))
    }

    pub fn with_services(
        db: Arc<SurrealDbClient>,
        config: AppConfig,
        services: Arc<dyn PipelineServices>,
    ) -> Self {
        Self {
            db,
            config,
            services,
        }
    }

    /// Runs one cycle. With an explicit topic the queue is bypassed for
    /// selection and the topic gets a single fetch attempt, left pending on
    /// not-found so a later cycle may retry or skip it. Without a topic,
    /// pending topics are tried oldest-first, up to `max_fetch_candidates`;
    /// a queued candidate whose summary does not exist will never succeed,
    /// so it is dequeued permanently before the next candidate is tried.
    pub async fn run_cycle(&self, requested: Option<String>) -> Result<LearnOutcome, AppError> {
        if let Some(topic) = requested {
            return self.attempt_topic(&topic, TopicSource::Explicit).await;
        }

        let candidate_budget = self.config.max_fetch_candidates.max(1);
        let mut last_missed: Option<LearnOutcome> = None;

        for _ in 0..candidate_budget {
            let Some(pending) = PendingTopic::next(&self.db).await? else {
                return Ok(LearnOutcome::queue_drained());
            };

            let outcome = self.attempt_topic(&pending.term, TopicSource::Queue).await?;
            if outcome.status != LearnStatus::NotFound {
                return Ok(outcome);
            }

            warn!(
                topic = %pending.term,
                "queued topic has no summary; dropping it permanently"
            );
            PendingTopic::dequeue(&pending.term, &self.db).await?;
            last_missed = Some(outcome);
        }

        last_missed.ok_or_else(|| {
            AppError::InternalError("candidate loop ended without an outcome".into())
        })
    }

    async fn attempt_topic(
        &self,
        topic: &str,
        source: TopicSource,
    ) -> Result<LearnOutcome, AppError> {
        let mut ctx = CycleContext::new(
            topic,
            source,
            self.db.as_ref(),
            &self.config,
            self.services.as_ref(),
        );

        let machine = ready();
        let cycle_started = Instant::now();

        let machine = select_topic(machine, &mut ctx).map_err(|err| ctx.abort(err))?;

        let stage_start = Instant::now();
        let Some(machine) = fetch_summary(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?
        else {
            return Ok(LearnOutcome::not_found(topic));
        };
        let fetch_ms = duration_millis(stage_start);

        let stage_start = Instant::now();
        let machine = extract_terms(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let extract_ms = duration_millis(stage_start);

        let stage_start = Instant::now();
        let machine = persist_vocabulary(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let persist_ms = duration_millis(stage_start);

        let stage_start = Instant::now();
        let machine = update_graph(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let graph_ms = duration_millis(stage_start);

        let stage_start = Instant::now();
        let _machine = update_queue(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let queue_ms = duration_millis(stage_start);

        info!(
            cycle_id = %ctx.cycle_id,
            topic = %ctx.topic,
            new_terms = ctx.new_terms.len(),
            total_ms = duration_millis(cycle_started),
            fetch_ms,
            extract_ms,
            persist_ms,
            graph_ms,
            queue_ms,
            "learning cycle finished"
        );

        Ok(LearnOutcome::learned(topic, &ctx.new_terms))
    }
}

fn duration_millis(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
