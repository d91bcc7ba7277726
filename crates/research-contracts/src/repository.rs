//! Persistence contracts for all entities. Persisted state layout is an
//! implementation detail of whatever implements these traits; the core only
//! relies on the invariants documented on each method.

use crate::audit_event::AuditEvent;
use crate::content_source::ContentSource;
use crate::error::CoreError;
use crate::ids::{ContentSourceId, IntegrationProposalId, QualityAssessmentId, ResearchRunId, ReviewQueueEntryId};
use crate::integration_proposal::IntegrationProposal;
use crate::quality_assessment::QualityAssessment;
use crate::research_run::ResearchRun;
use crate::review_queue_entry::{ReviewQueueEntry, ReviewStatus};
use async_trait::async_trait;

#[async_trait]
pub trait ResearchRunRepository: Send + Sync {
    async fn insert(&self, run: ResearchRun) -> Result<(), CoreError>;
    async fn get(&self, id: ResearchRunId) -> Result<ResearchRun, CoreError>;
    async fn update(&self, run: ResearchRun) -> Result<(), CoreError>;
    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<ResearchRun>, CoreError>;
    async fn pending(&self) -> Result<Vec<ResearchRun>, CoreError>;
    async fn running(&self) -> Result<Vec<ResearchRun>, CoreError>;
    /// Cascading delete of the run and everything it owns.
    async fn delete(&self, id: ResearchRunId) -> Result<(), CoreError>;
}

#[async_trait]
pub trait ContentSourceRepository: Send + Sync {
    /// Must enforce the `(research_run_id, content_hash)` uniqueness
    /// constraint, returning `CoreError::Conflict` on violation.
    async fn insert(&self, source: ContentSource) -> Result<(), CoreError>;
    async fn get(&self, id: ContentSourceId) -> Result<ContentSource, CoreError>;
    async fn list_for_run(&self, run_id: ResearchRunId) -> Result<Vec<ContentSource>, CoreError>;
    async fn find_by_hash(
        &self,
        run_id: ResearchRunId,
        content_hash: &str,
    ) -> Result<Option<ContentSource>, CoreError>;
}

#[async_trait]
pub trait QualityAssessmentRepository: Send + Sync {
    /// Must enforce at-most-one assessment per content source.
    async fn upsert(&self, assessment: QualityAssessment) -> Result<(), CoreError>;
    async fn get_by_source(
        &self,
        content_source_id: ContentSourceId,
    ) -> Result<Option<QualityAssessment>, CoreError>;
    async fn get(&self, id: QualityAssessmentId) -> Result<QualityAssessment, CoreError>;
    async fn list_for_run(&self, run_id: ResearchRunId) -> Result<Vec<QualityAssessment>, CoreError>;
}

#[async_trait]
pub trait IntegrationProposalRepository: Send + Sync {
    /// Must enforce at-most-one proposal per content source.
    async fn upsert(&self, proposal: IntegrationProposal) -> Result<(), CoreError>;
    async fn get_by_source(
        &self,
        content_source_id: ContentSourceId,
    ) -> Result<Option<IntegrationProposal>, CoreError>;
    async fn get(&self, id: IntegrationProposalId) -> Result<IntegrationProposal, CoreError>;
    async fn list_for_run(&self, run_id: ResearchRunId) -> Result<Vec<IntegrationProposal>, CoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReviewQueueFilter {
    pub status: Option<ReviewStatus>,
    pub research_run_id: Option<ResearchRunId>,
    pub assignee: Option<String>,
}

#[async_trait]
pub trait ReviewQueueRepository: Send + Sync {
    async fn insert(&self, entry: ReviewQueueEntry) -> Result<(), CoreError>;
    async fn get(&self, id: ReviewQueueEntryId) -> Result<ReviewQueueEntry, CoreError>;
    async fn update(&self, entry: ReviewQueueEntry) -> Result<(), CoreError>;
    async fn list(&self, filter: ReviewQueueFilter) -> Result<Vec<ReviewQueueEntry>, CoreError>;
}

#[async_trait]
pub trait AuditEventRepository: Send + Sync {
    /// Append-only; implementations must never allow update or delete of an
    /// existing event.
    async fn append(&self, event: AuditEvent) -> Result<(), CoreError>;
    async fn timeline(&self, run_id: ResearchRunId) -> Result<Vec<AuditEvent>, CoreError>;
}
