//! In-memory implementations of the repository trait family defined in
//! `research_contracts::repository`. Grounded on the `DashMap`-backed
//! collection style used throughout the teacher's research module
//! (`knowledge_seeker.rs`'s `active_sessions: Arc<DashMap<Uuid, ...>>`).
//!
//! These are not meant to be a production datastore — no persistence to
//! disk, no transactions spanning entities — just enough to back the
//! orchestrator end to end and keep the uniqueness invariants the trait
//! docs require.

pub mod audit_events;
pub mod content_sources;
pub mod integration_proposals;
pub mod quality_assessments;
pub mod research_runs;
pub mod review_queue;

pub use audit_events::InMemoryAuditEventRepository;
pub use content_sources::InMemoryContentSourceRepository;
pub use integration_proposals::InMemoryIntegrationProposalRepository;
pub use quality_assessments::InMemoryQualityAssessmentRepository;
pub use research_runs::InMemoryResearchRunRepository;
pub use review_queue::InMemoryReviewQueueRepository;
