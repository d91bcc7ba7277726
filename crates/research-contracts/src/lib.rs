//! Core data model, error kinds, and collaborator trait contracts for the
//! research orchestration core.
//!
//! Every other crate in the workspace depends on this one and nothing else
//! upstream; it has no knowledge of circuit breakers, scoring, or the
//! orchestrator itself.

pub mod audit_event;
pub mod collaborators;
pub mod common;
pub mod config;
pub mod content_source;
pub mod error;
pub mod ids;
pub mod integration_proposal;
pub mod quality_assessment;
pub mod repository;
pub mod research_run;
pub mod review_queue_entry;

pub use audit_event::{AuditEvent, EventLevel, EventType};
pub use collaborators::{AIAdapter, Embedder, ExternalClient, RawItem, ScoreSet, SimilarityMatch, VectorStore};
pub use common::{now, Bag, Provenance};
pub use config::{BreakerConfig, CoreConfig};
pub use content_source::{content_hash, ContentSource, SourceType};
pub use error::{CoreError, CoreResult, UnavailableReason};
pub use ids::{
    AuditEventId, ContentSourceId, IntegrationProposalId, QualityAssessmentId, ResearchRunId,
    ReviewQueueEntryId,
};
pub use integration_proposal::{
    estimate_effort, ConnectionKind, EstimatedEffort, IntegrationProposal, IntegrationStrategy,
    ProposalStatus, SuggestedConnection, SuggestedTag, ACTION_KINDS,
};
pub use quality_assessment::{
    composite_overall, AssessmentMethod, QualityAssessment, COMPLETENESS_WEIGHT, CREDIBILITY_WEIGHT,
    FRESHNESS_WEIGHT, RELEVANCE_WEIGHT,
};
pub use repository::{
    AuditEventRepository, ContentSourceRepository, IntegrationProposalRepository,
    QualityAssessmentRepository, ResearchRunRepository, ReviewQueueFilter, ReviewQueueRepository,
};
pub use research_run::{ResearchRun, RunCounters, RunStatus};
pub use review_queue_entry::{
    priority_from_overall, ReviewDecision, ReviewNote, ReviewQueueEntry, ReviewStatus,
};
