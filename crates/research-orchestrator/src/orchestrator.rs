//! `Orchestrator`: drives a `ResearchRun` through `DISCOVER -> ASSESS ->
//! PROPOSE -> ENQUEUE_REVIEW`, with per-stage failure isolation, the
//! DISCOVER/ASSESS recovery strategies, and run-scoped exclusive execution.
//! Grounded on `src/services/research_orchestrator.py`'s
//! `ResearchOrchestrator.execute_research`.

use crate::recovery::simplified_topic;
use dashmap::DashMap;
use research_audit::AuditLog;
use research_clients::ContentDiscoveryService;
use research_contracts::{
    AuditEvent, Bag, ContentSource, ContentSourceId, ContentSourceRepository, CoreConfig, CoreError, EventLevel,
    EventType, IntegrationProposal, IntegrationProposalRepository, QualityAssessmentRepository, ResearchRun,
    ResearchRunId, ResearchRunRepository, UnavailableReason,
};
use research_integration::IntegrationAnalyzer;
use research_review::ReviewQueue;
use research_scoring::QualityScorer;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_DISCOVERY_LIMIT: usize = 25;

enum StageOutcome {
    Completed,
    Cancelled,
}

/// Composition root for one research run's execution. Owns no persistent
/// state of its own beyond the run-scoped lock and cancellation tables; all
/// durable state lives in the injected repositories.
pub struct Orchestrator {
    runs: Arc<dyn ResearchRunRepository>,
    sources: Arc<dyn ContentSourceRepository>,
    assessments: Arc<dyn QualityAssessmentRepository>,
    proposals: Arc<dyn IntegrationProposalRepository>,
    discovery: Arc<ContentDiscoveryService>,
    scorer: Arc<QualityScorer>,
    analyzer: Arc<IntegrationAnalyzer>,
    review_queue: Arc<ReviewQueue>,
    audit: Arc<AuditLog>,
    config: CoreConfig,
    run_locks: DashMap<ResearchRunId, ()>,
    cancellations: DashMap<ResearchRunId, CancellationToken>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        runs: Arc<dyn ResearchRunRepository>,
        sources: Arc<dyn ContentSourceRepository>,
        assessments: Arc<dyn QualityAssessmentRepository>,
        proposals: Arc<dyn IntegrationProposalRepository>,
        discovery: Arc<ContentDiscoveryService>,
        scorer: Arc<QualityScorer>,
        analyzer: Arc<IntegrationAnalyzer>,
        review_queue: Arc<ReviewQueue>,
        audit: Arc<AuditLog>,
        config: CoreConfig,
    ) -> Self {
        Self {
            runs,
            sources,
            assessments,
            proposals,
            discovery,
            scorer,
            analyzer,
            review_queue,
            audit,
            config,
            run_locks: DashMap::new(),
            cancellations: DashMap::new(),
        }
    }

    pub async fn create(&self, topic: &str, created_by: &str, parameters: Bag) -> Result<ResearchRunId, CoreError> {
        let mut run = ResearchRun::new(topic, created_by)?;
        run.parameters = parameters;
        let id = run.id;
        self.runs.insert(run).await?;
        Ok(id)
    }

    pub async fn get(&self, run_id: ResearchRunId) -> Result<ResearchRun, CoreError> {
        self.runs.get(run_id).await
    }

    pub async fn list(&self, skip: usize, limit: usize) -> Result<Vec<ResearchRun>, CoreError> {
        self.runs.list(skip, limit).await
    }

    pub async fn pending(&self) -> Result<Vec<ResearchRun>, CoreError> {
        self.runs.pending().await
    }

    pub async fn running(&self) -> Result<Vec<ResearchRun>, CoreError> {
        self.runs.running().await
    }

    pub async fn generate_integration(&self, content_source_id: ContentSourceId) -> Result<IntegrationProposal, CoreError> {
        let source = self.sources.get(content_source_id).await?;
        self.analyzer.propose(&source).await
    }

    pub async fn get_integration(&self, content_source_id: ContentSourceId) -> Result<Option<IntegrationProposal>, CoreError> {
        self.proposals.get_by_source(content_source_id).await
    }

    /// Requests cancellation of an in-flight `execute`. A no-op if the run
    /// is not currently executing.
    pub fn cancel(&self, run_id: ResearchRunId) {
        if let Some(token) = self.cancellations.get(&run_id) {
            token.cancel();
        }
    }

    /// Runs the full stage graph for `run_id`. Only one `execute` may be in
    /// flight per run at a time; a concurrent call returns `Conflict`
    /// without disturbing the in-flight one.
    pub async fn execute(&self, run_id: ResearchRunId) -> Result<ResearchRun, CoreError> {
        if self.run_locks.insert(run_id, ()).is_some() {
            return Err(CoreError::conflict(format!("research run {run_id} is already executing")));
        }

        let token = CancellationToken::new();
        self.cancellations.insert(run_id, token.clone());
        let result = self.execute_locked(run_id, &token).await;
        self.run_locks.remove(&run_id);
        self.cancellations.remove(&run_id);
        result
    }

    /// Alias for `execute`, matching the external `research.start` operation.
    pub async fn start(&self, run_id: ResearchRunId) -> Result<ResearchRun, CoreError> {
        self.execute(run_id).await
    }

    async fn execute_locked(&self, run_id: ResearchRunId, cancel: &CancellationToken) -> Result<ResearchRun, CoreError> {
        let mut run = self.runs.get(run_id).await?;
        run.start()?;
        self.runs.update(run.clone()).await?;

        let mut start_payload = Bag::new();
        start_payload.insert("topic".to_string(), serde_json::json!(run.topic));
        self.audit
            .append(AuditEvent::new(run_id, EventType::ResearchStart, EventLevel::Info, start_payload))
            .await?;

        let outcome = self.run_stages(&mut run, cancel).await;

        let mut complete_payload = Bag::new();
        match outcome {
            Ok(StageOutcome::Completed) => {
                run.complete()?;
                complete_payload.insert("final_status".to_string(), serde_json::json!("COMPLETED"));
                self.audit
                    .append(AuditEvent::new(run_id, EventType::ResearchComplete, EventLevel::Info, complete_payload))
                    .await?;
            }
            Ok(StageOutcome::Cancelled) => {
                run.cancel()?;
                complete_payload.insert("final_status".to_string(), serde_json::json!("CANCELLED"));
                self.audit
                    .append(AuditEvent::new(run_id, EventType::ResearchComplete, EventLevel::Warning, complete_payload))
                    .await?;
            }
            Err(err) => {
                run.fail(err.to_string())?;
                complete_payload.insert("final_status".to_string(), serde_json::json!("FAILED"));
                complete_payload.insert("error".to_string(), serde_json::json!(err.to_string()));
                self.audit
                    .append(AuditEvent::new(run_id, EventType::ResearchComplete, EventLevel::Error, complete_payload))
                    .await?;
            }
        }

        self.runs.update(run.clone()).await?;
        Ok(run)
    }

    async fn run_stages(&self, run: &mut ResearchRun, cancel: &CancellationToken) -> Result<StageOutcome, CoreError> {
        if cancel.is_cancelled() {
            return Ok(StageOutcome::Cancelled);
        }
        let discovered = self.discover_stage(run).await?;

        if cancel.is_cancelled() {
            return Ok(StageOutcome::Cancelled);
        }
        let assessed = self.assess_stage(run, &discovered).await?;

        if cancel.is_cancelled() {
            return Ok(StageOutcome::Cancelled);
        }
        let proposed = self.propose_stage(run, &assessed).await?;

        if cancel.is_cancelled() {
            return Ok(StageOutcome::Cancelled);
        }
        self.enqueue_review_stage(run, &assessed, &proposed).await?;

        Ok(StageOutcome::Completed)
    }

    /// DISCOVER: fan out to every client. Fails only if every client was
    /// unavailable, in which case a simplified-topic retry is attempted
    /// first, then a one-client-at-a-time sweep.
    async fn discover_stage(&self, run: &mut ResearchRun) -> Result<Vec<ContentSource>, CoreError> {
        let topic = run.topic.clone();
        let primary = self.discovery.discover(run.id, &topic, DEFAULT_DISCOVERY_LIMIT, "orchestrator").await;

        let outcome = match primary {
            Ok(outcome) => outcome,
            Err(primary_err) => {
                let simplified = simplified_topic(&topic);
                let retry = if !simplified.is_empty() && simplified != topic {
                    self.discovery.discover(run.id, &simplified, DEFAULT_DISCOVERY_LIMIT, "orchestrator").await.ok()
                } else {
                    None
                };

                let recovered = match retry.filter(|o| !o.sources.is_empty()) {
                    Some(outcome) => Some(outcome),
                    None => self
                        .discovery
                        .discover_sequential(run.id, &topic, DEFAULT_DISCOVERY_LIMIT, "orchestrator")
                        .await
                        .ok()
                        .filter(|o| !o.sources.is_empty()),
                };

                self.record_recovery(run.id, "DISCOVER", recovered.is_some()).await?;

                match recovered {
                    Some(outcome) => outcome,
                    None => return Err(primary_err),
                }
            }
        };

        for event in outcome.audit_events {
            self.audit.append(event).await?;
        }

        let mut persisted = Vec::with_capacity(outcome.sources.len());
        for source in outcome.sources {
            self.sources.insert(source.clone()).await?;
            persisted.push(source);
        }

        run.record_discovered(persisted.len() as u64);
        self.runs.update(run.clone()).await?;
        Ok(persisted)
    }

    /// ASSESS: per-source failure isolation. The stage as a whole fails
    /// only if every source failed (and at least one existed), in which
    /// case every source is retried once through the deterministic
    /// fallback scorer.
    async fn assess_stage(&self, run: &mut ResearchRun, sources: &[ContentSource]) -> Result<Vec<ContentSource>, CoreError> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let (mut assessed, mut failed) = self.score_all(sources, &run.topic, false).await?;

        if assessed.is_empty() {
            let (recovered, recovered_failed) = self.score_all(sources, &run.topic, true).await?;
            let success = !recovered.is_empty();
            self.record_recovery(run.id, "ASSESS", success).await?;
            if !success {
                return Err(CoreError::unavailable(
                    "quality-scorer",
                    UnavailableReason::DependencyFailure,
                    "no source could be assessed, including through the fallback path",
                ));
            }
            assessed = recovered;
            failed = recovered_failed;
        }

        let mut payload = Bag::new();
        payload.insert("completed".to_string(), serde_json::json!(assessed.len()));
        payload.insert("failed".to_string(), serde_json::json!(failed));
        self.audit
            .append(AuditEvent::new(run.id, EventType::QualityAssessment, EventLevel::Info, payload))
            .await?;

        run.record_assessed(assessed.len() as u64);
        self.runs.update(run.clone()).await?;
        Ok(assessed)
    }

    async fn score_all(
        &self,
        sources: &[ContentSource],
        topic: &str,
        fallback_only: bool,
    ) -> Result<(Vec<ContentSource>, u64), CoreError> {
        let semaphore = Arc::new(Semaphore::new(self.config.stage_concurrency_cap.max(1)));
        let mut handles = Vec::with_capacity(sources.len());
        for source in sources.iter().cloned() {
            let semaphore = semaphore.clone();
            let scorer = self.scorer.clone();
            let topic = topic.to_string();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
                let result = if fallback_only {
                    scorer.score_with_fallback_only(&source, &topic).await
                } else {
                    scorer.score(&source, &topic).await
                };
                (source, result)
            }));
        }

        let mut assessed = Vec::new();
        let mut failed = 0u64;
        for handle in handles {
            let (source, result) = handle.await.map_err(|e| CoreError::internal(format!("assess task panicked: {e}")))?;
            match result {
                Ok(assessment) => {
                    self.assessments.upsert(assessment).await?;
                    assessed.push(source);
                }
                Err(err) => {
                    warn!(source_id = %source.id, error = %err, "quality assessment failed for source");
                    failed += 1;
                }
            }
        }
        Ok((assessed, failed))
    }

    /// PROPOSE: per-source failure isolation, no recovery strategy. The
    /// stage fails only if every source failed and at least one existed.
    async fn propose_stage(&self, run: &mut ResearchRun, sources: &[ContentSource]) -> Result<Vec<ContentSource>, CoreError> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.config.stage_concurrency_cap.max(1)));
        let mut handles = Vec::with_capacity(sources.len());
        for source in sources.iter().cloned() {
            let semaphore = semaphore.clone();
            let analyzer = self.analyzer.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
                let result = analyzer.propose(&source).await;
                (source, result)
            }));
        }

        let mut proposed = Vec::new();
        let mut failed = 0u64;
        for handle in handles {
            let (source, result) = handle.await.map_err(|e| CoreError::internal(format!("propose task panicked: {e}")))?;
            match result {
                Ok(_) => proposed.push(source),
                Err(err) => {
                    warn!(source_id = %source.id, error = %err, "integration proposal failed for source");
                    failed += 1;
                }
            }
        }

        if proposed.is_empty() {
            return Err(CoreError::unavailable(
                "integration-analyzer",
                UnavailableReason::DependencyFailure,
                "no source could be proposed for integration",
            ));
        }

        let mut payload = Bag::new();
        payload.insert("generated".to_string(), serde_json::json!(proposed.len()));
        payload.insert("failed".to_string(), serde_json::json!(failed));
        self.audit
            .append(AuditEvent::new(run.id, EventType::IntegrationProposal, EventLevel::Info, payload))
            .await?;

        Ok(proposed)
    }

    /// ENQUEUE_REVIEW: one entry per source that has both an assessment and
    /// a proposal, priority derived from the assessment's overall score.
    async fn enqueue_review_stage(
        &self,
        run: &mut ResearchRun,
        assessed: &[ContentSource],
        proposed: &[ContentSource],
    ) -> Result<(), CoreError> {
        let proposed_ids: HashSet<_> = proposed.iter().map(|s| s.id).collect();
        let mut enqueued = 0u64;

        for source in assessed {
            if !proposed_ids.contains(&source.id) {
                continue;
            }
            let overall = self.assessments.get_by_source(source.id).await?.map(|a| a.overall);
            self.review_queue.enqueue(source.id, run.id, overall).await?;
            enqueued += 1;
        }

        let mut payload = Bag::new();
        payload.insert("created".to_string(), serde_json::json!(enqueued));
        self.audit
            .append(AuditEvent::new(run.id, EventType::ReviewQueue, EventLevel::Info, payload))
            .await?;

        info!(run_id = %run.id, enqueued, "review queue populated");
        Ok(())
    }

    async fn record_recovery(&self, run_id: ResearchRunId, stage: &str, success: bool) -> Result<(), CoreError> {
        let mut payload = Bag::new();
        payload.insert("stage".to_string(), serde_json::json!(stage));
        payload.insert("success".to_string(), serde_json::json!(success));
        let level = if success { EventLevel::Info } else { EventLevel::Error };
        self.audit.append(AuditEvent::new(run_id, EventType::Recovery, level, payload)).await
    }
}
