//! Queue operations over `ReviewQueueEntry`: enqueue, list, assign, decide,
//! reassign, batch-decide. Grounded on `src/services/review_processor.py`'s
//! queue-facing methods, split from approval processing (see
//! [`crate::processor::ReviewProcessor`]).

use crate::processor::ReviewProcessor;
use research_audit::AuditLog;
use research_contracts::{
    AuditEvent, Bag, ContentSourceId, ContentSourceRepository, CoreError, EventLevel, EventType, ResearchRunId,
    ReviewDecision, ReviewQueueEntry, ReviewQueueEntryId, ReviewQueueFilter, ReviewQueueRepository, ReviewStatus,
    priority_from_overall,
};
use std::sync::Arc;

pub struct ReviewQueue {
    repository: Arc<dyn ReviewQueueRepository>,
    sources: Arc<dyn ContentSourceRepository>,
    audit: Arc<AuditLog>,
    processor: Arc<ReviewProcessor>,
}

impl ReviewQueue {
    pub fn new(
        repository: Arc<dyn ReviewQueueRepository>,
        sources: Arc<dyn ContentSourceRepository>,
        audit: Arc<AuditLog>,
        processor: Arc<ReviewProcessor>,
    ) -> Self {
        Self { repository, sources, audit, processor }
    }

    pub async fn enqueue(
        &self,
        content_source_id: ContentSourceId,
        research_run_id: ResearchRunId,
        assessment_overall: Option<f64>,
    ) -> Result<ReviewQueueEntry, CoreError> {
        let priority = priority_from_overall(assessment_overall);
        let entry = ReviewQueueEntry::new(content_source_id, research_run_id, priority);
        self.repository.insert(entry.clone()).await?;

        let mut payload = Bag::new();
        payload.insert("entry_id".to_string(), serde_json::json!(entry.id.to_string()));
        payload.insert("content_source_id".to_string(), serde_json::json!(content_source_id.to_string()));
        payload.insert("priority".to_string(), serde_json::json!(priority));
        self.audit
            .append(AuditEvent::new(research_run_id, EventType::ReviewQueue, EventLevel::Info, payload))
            .await?;

        Ok(entry)
    }

    pub async fn list(&self, filter: ReviewQueueFilter) -> Result<Vec<ReviewQueueEntry>, CoreError> {
        self.repository.list(filter).await
    }

    pub async fn assign(&self, entry_id: ReviewQueueEntryId, assignee: impl Into<String>) -> Result<ReviewQueueEntry, CoreError> {
        let mut entry = self.repository.get(entry_id).await?;
        entry.assign(assignee)?;
        self.repository.update(entry.clone()).await?;
        Ok(entry)
    }

    /// Reassigns an entry that is already `ASSIGNED`, recording the previous
    /// and new assignee in `review_notes`. `ReviewQueueEntry::assign` only
    /// covers the PENDING/ESCALATED origin states, so an already-assigned
    /// entry is reassigned here instead of by re-entering that state
    /// machine.
    pub async fn reassign(&self, entry_id: ReviewQueueEntryId, assignee: impl Into<String>) -> Result<ReviewQueueEntry, CoreError> {
        let mut entry = self.repository.get(entry_id).await?;
        if entry.status != ReviewStatus::Assigned {
            entry.assign(assignee)?;
        } else {
            let assignee = assignee.into();
            let previous = entry.assigned_to.clone().unwrap_or_else(|| "unassigned".to_string());
            entry.review_notes.push(research_contracts::ReviewNote {
                author: "system".to_string(),
                text: format!("reassigned from {previous} to {assignee}"),
                at: research_contracts::now(),
            });
            entry.assigned_to = Some(assignee);
            entry.assigned_at = Some(research_contracts::now());
            entry.updated_at = research_contracts::now();
        }
        self.repository.update(entry.clone()).await?;
        Ok(entry)
    }

    pub async fn decide(
        &self,
        entry_id: ReviewQueueEntryId,
        decision: ReviewDecision,
        author: impl Into<String>,
        notes: Option<String>,
    ) -> Result<ReviewQueueEntry, CoreError> {
        let mut entry = self.repository.get(entry_id).await?;
        entry.decide(decision, author, notes)?;
        self.repository.update(entry.clone()).await?;

        let mut payload = Bag::new();
        payload.insert("entry_id".to_string(), serde_json::json!(entry.id.to_string()));
        payload.insert("decision".to_string(), serde_json::json!(format!("{decision:?}")));
        self.audit
            .append(AuditEvent::new(entry.research_run_id, EventType::ReviewDecision, EventLevel::Info, payload))
            .await?;

        if decision == ReviewDecision::Approve {
            let source = self.sources.get(entry.content_source_id).await?;
            self.processor.on_approved(&source).await?;
        }

        Ok(entry)
    }

    pub async fn batch_decide(
        &self,
        entry_ids: &[ReviewQueueEntryId],
        decision: ReviewDecision,
        author: impl Into<String> + Clone,
        notes: Option<String>,
    ) -> Vec<Result<ReviewQueueEntry, CoreError>> {
        let mut results = Vec::with_capacity(entry_ids.len());
        for entry_id in entry_ids {
            results.push(self.decide(*entry_id, decision, author.clone(), notes.clone()).await);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use research_contracts::{
        AuditEventRepository, ContentSource, Embedder, IntegrationProposalRepository, ResearchRun, ResearchRunRepository,
        SimilarityMatch, SourceType, VectorStore,
    };
    use research_db::{
        InMemoryAuditEventRepository, InMemoryContentSourceRepository, InMemoryIntegrationProposalRepository,
        InMemoryResearchRunRepository, InMemoryReviewQueueRepository,
    };
    use research_integration::IntegrationAnalyzer;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, CoreError> {
            Ok(vec![0.1, 0.2])
        }
    }

    struct StubVectorStore;

    #[async_trait]
    impl VectorStore for StubVectorStore {
        async fn find_similar(&self, _vector: &[f32], _k: usize, _min_similarity: f64) -> Result<Vec<SimilarityMatch>, CoreError> {
            Ok(vec![])
        }
        async fn upsert(&self, _id: &str, _vector: &[f32]) -> Result<(), CoreError> {
            Ok(())
        }
    }

    struct Harness {
        queue: ReviewQueue,
        sources: Arc<dyn ContentSourceRepository>,
        runs: Arc<dyn ResearchRunRepository>,
    }

    fn harness() -> Harness {
        let repo: Arc<dyn ReviewQueueRepository> = Arc::new(InMemoryReviewQueueRepository::new());
        let audit_repo: Arc<dyn AuditEventRepository> = Arc::new(InMemoryAuditEventRepository::new());
        let audit = Arc::new(AuditLog::new(audit_repo));
        let sources: Arc<dyn ContentSourceRepository> = Arc::new(InMemoryContentSourceRepository::new());
        let runs: Arc<dyn ResearchRunRepository> = Arc::new(InMemoryResearchRunRepository::new());
        let proposals: Arc<dyn IntegrationProposalRepository> = Arc::new(InMemoryIntegrationProposalRepository::new());
        let analyzer = Arc::new(IntegrationAnalyzer::new(Arc::new(StubEmbedder), Arc::new(StubVectorStore), proposals.clone()));
        let processor = Arc::new(ReviewProcessor::new(proposals, runs.clone(), analyzer));
        let queue = ReviewQueue::new(repo, sources.clone(), audit, processor);
        Harness { queue, sources, runs }
    }

    fn queue() -> ReviewQueue {
        harness().queue
    }

    #[tokio::test]
    async fn enqueue_derives_priority_from_overall_score() {
        let queue = queue();
        let entry = queue.enqueue(ContentSourceId::new(), ResearchRunId::new(), Some(0.87)).await.unwrap();
        assert_eq!(entry.priority, 9);
    }

    #[tokio::test]
    async fn enqueue_without_assessment_defaults_priority_to_five() {
        let queue = queue();
        let entry = queue.enqueue(ContentSourceId::new(), ResearchRunId::new(), None).await.unwrap();
        assert_eq!(entry.priority, 5);
    }

    #[tokio::test]
    async fn reassign_from_assigned_records_both_assignees() {
        let queue = queue();
        let entry = queue.enqueue(ContentSourceId::new(), ResearchRunId::new(), None).await.unwrap();
        queue.assign(entry.id, "alice").await.unwrap();
        let reassigned = queue.reassign(entry.id, "bob").await.unwrap();
        assert_eq!(reassigned.assigned_to.as_deref(), Some("bob"));
        assert!(reassigned.review_notes.iter().any(|n| n.text.contains("reassigned from alice to bob")));
    }

    #[tokio::test]
    async fn approving_an_entry_generates_and_approves_its_integration_proposal() {
        let Harness { queue, sources, runs } = harness();
        let run = ResearchRun::new("topic", "tester").unwrap();
        let run_id = run.id;
        runs.insert(run).await.unwrap();
        let source = ContentSource::new(run_id, SourceType::Web, "title", "https://example.org/x", "search", "tester").unwrap();
        sources.insert(source.clone()).await.unwrap();

        let entry = queue.enqueue(source.id, run_id, Some(0.9)).await.unwrap();
        queue.assign(entry.id, "alice").await.unwrap();
        queue.decide(entry.id, ReviewDecision::Approve, "alice", None).await.unwrap();

        assert_eq!(runs.get(run_id).await.unwrap().counters.sources_approved, 1);
    }

    #[tokio::test]
    async fn batch_decide_applies_to_every_entry() {
        let queue = queue();
        let a = queue.enqueue(ContentSourceId::new(), ResearchRunId::new(), None).await.unwrap();
        let b = queue.enqueue(ContentSourceId::new(), ResearchRunId::new(), None).await.unwrap();
        queue.assign(a.id, "alice").await.unwrap();
        queue.assign(b.id, "alice").await.unwrap();

        let results = queue.batch_decide(&[a.id, b.id], ReviewDecision::Reject, "alice", None).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(results[0].as_ref().unwrap().status, ReviewStatus::Rejected);
    }
}
