//! Composition root: wires every crate's in-memory repositories and
//! collaborators into one `Orchestrator` + supporting services, standing in
//! for the out-of-scope HTTP layer (`spec.md` §1). Grounded on
//! `agent-agency-database`'s `DatabaseConfig::from_env`-driven setup and
//! `council`'s main-binary wiring.

use research_audit::AuditLog;
use research_clients::{AcademicClient, ContentDiscoveryService, NewsClient, WebSearchClient};
use research_contracts::{
    AuditEventRepository, ContentSourceRepository, CoreConfig, ExternalClient, IntegrationProposalRepository,
    QualityAssessmentRepository, ResearchRunRepository, ReviewQueueRepository,
};
use research_db::{
    InMemoryAuditEventRepository, InMemoryContentSourceRepository, InMemoryIntegrationProposalRepository,
    InMemoryQualityAssessmentRepository, InMemoryResearchRunRepository, InMemoryReviewQueueRepository,
};
use research_integration::{DeterministicEmbedder, InMemoryVectorStore, IntegrationAnalyzer};
use research_metrics::MetricsCollector;
use research_orchestrator::Orchestrator;
use research_resilience::CircuitBreakerRegistry;
use research_review::{ReviewProcessor, ReviewQueue};
use research_scoring::QualityScorer;
use std::sync::Arc;

/// Every service the CLI's subcommands need, built once at startup.
pub struct App {
    pub orchestrator: Arc<Orchestrator>,
    pub audit: Arc<AuditLog>,
    pub metrics: Arc<MetricsCollector>,
    pub review_queue: Arc<ReviewQueue>,
    pub review_processor: Arc<ReviewProcessor>,
    pub sources: Arc<dyn ContentSourceRepository>,
}

impl App {
    pub fn new(config: CoreConfig) -> Self {
        let runs: Arc<dyn ResearchRunRepository> = Arc::new(InMemoryResearchRunRepository::new());
        let sources: Arc<dyn ContentSourceRepository> = Arc::new(InMemoryContentSourceRepository::new());
        let assessments: Arc<dyn QualityAssessmentRepository> = Arc::new(InMemoryQualityAssessmentRepository::new());
        let proposals: Arc<dyn IntegrationProposalRepository> = Arc::new(InMemoryIntegrationProposalRepository::new());
        let review_repo: Arc<dyn ReviewQueueRepository> = Arc::new(InMemoryReviewQueueRepository::new());
        let audit_repo: Arc<dyn AuditEventRepository> = Arc::new(InMemoryAuditEventRepository::new());

        let audit = Arc::new(AuditLog::new(audit_repo));
        let breakers = Arc::new(CircuitBreakerRegistry::new(config.clone()));

        let discovery = Arc::new(ContentDiscoveryService::new(
            discovery_clients(),
            breakers.clone(),
            config.stage_deadline,
        ));

        // No AI adapter is wired by default; scoring runs the deterministic
        // fallback path unless a caller sets `config.ai_enabled` and
        // supplies one through a future extension point.
        let scorer = Arc::new(QualityScorer::new(None, breakers, config.clone()));

        let embedder: Arc<dyn research_contracts::Embedder> = Arc::new(DeterministicEmbedder);
        let vector_store: Arc<dyn research_contracts::VectorStore> = Arc::new(InMemoryVectorStore::new());
        let analyzer = Arc::new(IntegrationAnalyzer::new(embedder, vector_store, proposals.clone()));

        let review_processor = Arc::new(ReviewProcessor::new(proposals.clone(), runs.clone(), analyzer.clone()));
        let review_queue = Arc::new(ReviewQueue::new(review_repo, sources.clone(), audit.clone(), review_processor.clone()));

        let orchestrator = Arc::new(Orchestrator::new(
            runs.clone(),
            sources.clone(),
            assessments.clone(),
            proposals,
            discovery,
            scorer,
            analyzer,
            review_queue.clone(),
            audit.clone(),
            config,
        ));

        let metrics = Arc::new(MetricsCollector::new(audit.clone(), runs, assessments));

        Self { orchestrator, audit, metrics, review_queue, review_processor, sources }
    }
}

/// Builds whichever `ExternalClient`s have credentials available in the
/// environment; `AcademicClient` needs none and is always included.
fn discovery_clients() -> Vec<Arc<dyn ExternalClient>> {
    let mut clients: Vec<Arc<dyn ExternalClient>> = vec![Arc::new(AcademicClient::new())];

    if let (Ok(api_key), Ok(engine_id)) = (std::env::var("GOOGLE_API_KEY"), std::env::var("GOOGLE_SEARCH_ENGINE_ID")) {
        clients.push(Arc::new(WebSearchClient::new(api_key, engine_id)));
    }
    if let Ok(api_key) = std::env::var("NEWS_API_KEY") {
        clients.push(Arc::new(NewsClient::new(api_key)));
    }

    clients
}
