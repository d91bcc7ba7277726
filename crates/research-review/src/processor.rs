//! `ReviewProcessor`: reacts to an approval decision. Grounded on
//! `src/services/review_processor.py`, with the redesign noted in
//! `spec.md` §9 already applied: approval only transitions
//! `IntegrationProposal::status` — the proposal itself was generated once,
//! during the PROPOSE stage, not regenerated here. Generation is attempted
//! only as a defensive fallback if no proposal exists yet.

use research_contracts::{ContentSource, CoreError, IntegrationProposal, IntegrationProposalRepository, ResearchRunRepository};
use research_integration::IntegrationAnalyzer;
use std::sync::Arc;

pub struct ReviewProcessor {
    proposals: Arc<dyn IntegrationProposalRepository>,
    runs: Arc<dyn ResearchRunRepository>,
    analyzer: Arc<IntegrationAnalyzer>,
}

impl ReviewProcessor {
    pub fn new(
        proposals: Arc<dyn IntegrationProposalRepository>,
        runs: Arc<dyn ResearchRunRepository>,
        analyzer: Arc<IntegrationAnalyzer>,
    ) -> Self {
        Self { proposals, runs, analyzer }
    }

    pub async fn on_approved(&self, source: &ContentSource) -> Result<IntegrationProposal, CoreError> {
        let mut proposal = match self.proposals.get_by_source(source.id).await? {
            Some(existing) => existing,
            None => self.analyzer.propose(source).await?,
        };
        proposal.approve()?;
        self.proposals.upsert(proposal.clone()).await?;

        let mut run = self.runs.get(source.research_run_id).await?;
        run.record_approved(1);
        self.runs.update(run).await?;

        Ok(proposal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use research_contracts::{Embedder, ResearchRunId, SimilarityMatch, SourceType, VectorStore};
    use research_contracts::ResearchRun;
    use research_db::{InMemoryIntegrationProposalRepository, InMemoryResearchRunRepository};

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

    fn source(run_id: ResearchRunId) -> ContentSource {
        ContentSource::new(run_id, SourceType::Web, "title", "https://example.org/x", "search", "tester").unwrap()
    }

    #[tokio::test]
    async fn generates_a_proposal_when_none_exists_yet_and_approves_it() {
        let proposals: Arc<dyn IntegrationProposalRepository> = Arc::new(InMemoryIntegrationProposalRepository::new());
        let runs: Arc<dyn ResearchRunRepository> = Arc::new(InMemoryResearchRunRepository::new());
        let run = ResearchRun::new("topic", "tester").unwrap();
        let run_id = run.id;
        runs.insert(run).await.unwrap();
        let analyzer = Arc::new(IntegrationAnalyzer::new(Arc::new(StubEmbedder), Arc::new(StubVectorStore), proposals.clone()));
        let processor = ReviewProcessor::new(proposals, runs.clone(), analyzer);

        let source = source(run_id);
        let proposal = processor.on_approved(&source).await.unwrap();
        assert_eq!(proposal.status, research_contracts::ProposalStatus::Approved);
        assert_eq!(runs.get(run_id).await.unwrap().counters.sources_approved, 1);
    }

    #[tokio::test]
    async fn approving_twice_does_not_regenerate_the_proposal() {
        let proposals: Arc<dyn IntegrationProposalRepository> = Arc::new(InMemoryIntegrationProposalRepository::new());
        let runs: Arc<dyn ResearchRunRepository> = Arc::new(InMemoryResearchRunRepository::new());
        let run = ResearchRun::new("topic", "tester").unwrap();
        let run_id = run.id;
        runs.insert(run).await.unwrap();
        let analyzer = Arc::new(IntegrationAnalyzer::new(Arc::new(StubEmbedder), Arc::new(StubVectorStore), proposals.clone()));
        let processor = ReviewProcessor::new(proposals.clone(), runs, analyzer.clone());

        let source = source(run_id);
        let existing = analyzer.propose(&source).await.unwrap();
        let approved = processor.on_approved(&source).await.unwrap();
        assert_eq!(existing.id, approved.id);
    }
}
