//! `IntegrationAnalyzer`: embeds a source, finds vector-store neighbors, and
//! composes connection suggestions, tag suggestions, strategy, confidence,
//! and effort into an `IntegrationProposal`.

use crate::connections::suggest_connections;
use crate::tags::suggest_tags;
use research_contracts::{
    ContentSource, CoreError, Embedder, IntegrationProposal, IntegrationProposalRepository, IntegrationStrategy,
    SourceType, VectorStore, ACTION_KINDS,
};
use std::collections::HashMap;
use std::sync::Arc;

const NEIGHBOR_K: usize = 10;
const MIN_SIMILARITY: f64 = 0.5;
const MAX_TAGS: usize = 15;
const HIGH_SIMILARITY_CONFIDENCE_BOOST_THRESHOLD: f64 = 0.7;

pub struct IntegrationAnalyzer {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    proposals: Arc<dyn IntegrationProposalRepository>,
}

impl IntegrationAnalyzer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        proposals: Arc<dyn IntegrationProposalRepository>,
    ) -> Self {
        Self { embedder, vector_store, proposals }
    }

    /// Returns the existing proposal for `source` if one already exists;
    /// otherwise generates, persists, and returns a new one.
    pub async fn propose(&self, source: &ContentSource) -> Result<IntegrationProposal, CoreError> {
        if let Some(existing) = self.proposals.get_by_source(source.id).await? {
            return Ok(existing);
        }

        let combined = source.combined_text();
        let embedding = self.embedder.embed(&combined).await?;
        let neighbors = self.vector_store.find_similar(&embedding, NEIGHBOR_K, MIN_SIMILARITY).await?;

        let connections = suggest_connections(&source.title, &neighbors);
        let suggested_tags = suggest_tags(
            &source.title,
            source.description.as_deref().unwrap_or(""),
            &combined,
            source.source_type,
            &neighbors,
            MAX_TAGS,
        );

        let avg_similarity = if neighbors.is_empty() {
            0.0
        } else {
            neighbors.iter().map(|n| n.similarity).sum::<f64>() / neighbors.len() as f64
        };

        let strategy = match source.source_type {
            SourceType::Academic => IntegrationStrategy::Comprehensive,
            _ if avg_similarity >= 0.8 => IntegrationStrategy::Deep,
            _ if avg_similarity >= 0.6 => IntegrationStrategy::Standard,
            _ => IntegrationStrategy::Basic,
        };

        let mut confidence = avg_similarity;
        if neighbors.iter().any(|n| n.similarity >= HIGH_SIMILARITY_CONFIDENCE_BOOST_THRESHOLD) {
            confidence += 0.1;
        }
        confidence = confidence.clamp(0.0, 1.0);

        let proposed_actions = default_actions(&connections, &suggested_tags);

        let proposal = IntegrationProposal::new(
            source.id,
            source.research_run_id,
            strategy,
            proposed_actions,
            confidence,
            connections,
            suggested_tags,
        )?;

        self.proposals.upsert(proposal.clone()).await?;
        Ok(proposal)
    }
}

fn default_actions(
    connections: &[research_contracts::SuggestedConnection],
    tags: &[research_contracts::SuggestedTag],
) -> HashMap<String, bool> {
    let mut actions: HashMap<String, bool> = ACTION_KINDS.iter().map(|k| (k.to_string(), false)).collect();
    actions.insert("create_node".to_string(), true);
    actions.insert("create_summary".to_string(), true);
    if !connections.is_empty() {
        actions.insert("create_connections".to_string(), true);
    }
    if !tags.is_empty() {
        actions.insert("add_tags".to_string(), true);
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use research_contracts::{ResearchRunId, SimilarityMatch};
    use std::sync::Mutex;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, CoreError> {
            Ok(vec![0.1, 0.2, 0.3])
        }
    }

    struct StubVectorStore {
        neighbors: Vec<SimilarityMatch>,
    }

    #[async_trait]
    impl VectorStore for StubVectorStore {
        async fn find_similar(&self, _vector: &[f32], _k: usize, _min_similarity: f64) -> Result<Vec<SimilarityMatch>, CoreError> {
            Ok(self.neighbors.clone())
        }
        async fn upsert(&self, _id: &str, _vector: &[f32]) -> Result<(), CoreError> {
            Ok(())
        }
    }

    struct InMemoryProposalRepo {
        store: Mutex<HashMap<research_contracts::IntegrationProposalId, IntegrationProposal>>,
    }

    impl InMemoryProposalRepo {
        fn new() -> Self {
            Self { store: Mutex::new(HashMap::new()) }
        }
    }

    #[async_trait]
    impl IntegrationProposalRepository for InMemoryProposalRepo {
        async fn upsert(&self, proposal: IntegrationProposal) -> Result<(), CoreError> {
            self.store.lock().unwrap().insert(proposal.id, proposal);
            Ok(())
        }
        async fn get_by_source(
            &self,
            content_source_id: research_contracts::ContentSourceId,
        ) -> Result<Option<IntegrationProposal>, CoreError> {
            Ok(self.store.lock().unwrap().values().find(|p| p.content_source_id == content_source_id).cloned())
        }
        async fn get(&self, id: research_contracts::IntegrationProposalId) -> Result<IntegrationProposal, CoreError> {
            self.store.lock().unwrap().get(&id).cloned().ok_or_else(|| CoreError::not_found("proposal"))
        }
        async fn list_for_run(&self, run_id: ResearchRunId) -> Result<Vec<IntegrationProposal>, CoreError> {
            Ok(self.store.lock().unwrap().values().filter(|p| p.research_run_id == run_id).cloned().collect())
        }
    }

    fn source() -> ContentSource {
        ContentSource::new(
            ResearchRunId::new(),
            SourceType::Web,
            "A piece about transformers",
            "https://example.org/x",
            "test",
            "tester",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn propose_is_idempotent_for_the_same_source() {
        let repo = Arc::new(InMemoryProposalRepo::new());
        let analyzer = IntegrationAnalyzer::new(Arc::new(StubEmbedder), Arc::new(StubVectorStore { neighbors: vec![] }), repo);
        let source = source();
        let first = analyzer.propose(&source).await.unwrap();
        let second = analyzer.propose(&source).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn academic_sources_always_use_comprehensive_strategy() {
        let repo = Arc::new(InMemoryProposalRepo::new());
        let analyzer = IntegrationAnalyzer::new(Arc::new(StubEmbedder), Arc::new(StubVectorStore { neighbors: vec![] }), repo);
        let mut source = source();
        source.source_type = SourceType::Academic;
        let proposal = analyzer.propose(&source).await.unwrap();
        assert_eq!(proposal.strategy, IntegrationStrategy::Comprehensive);
    }

    #[tokio::test]
    async fn high_similarity_neighbor_boosts_confidence() {
        let repo = Arc::new(InMemoryProposalRepo::new());
        let neighbor = SimilarityMatch { id: research_contracts::ContentSourceId::new().to_string(), similarity: 0.75, title: None, tags: vec![] };
        let analyzer = IntegrationAnalyzer::new(Arc::new(StubEmbedder), Arc::new(StubVectorStore { neighbors: vec![neighbor] }), repo);
        let proposal = analyzer.propose(&source()).await.unwrap();
        assert!(proposal.confidence > 0.75);
    }
}
