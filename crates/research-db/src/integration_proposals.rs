use async_trait::async_trait;
use dashmap::DashMap;
use research_contracts::{ContentSourceId, CoreError, IntegrationProposal, IntegrationProposalId, IntegrationProposalRepository, ResearchRunId};

#[derive(Debug, Default)]
pub struct InMemoryIntegrationProposalRepository {
    proposals: DashMap<IntegrationProposalId, IntegrationProposal>,
}

impl InMemoryIntegrationProposalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IntegrationProposalRepository for InMemoryIntegrationProposalRepository {
    async fn upsert(&self, proposal: IntegrationProposal) -> Result<(), CoreError> {
        let existing_for_source = self
            .proposals
            .iter()
            .find(|e| e.value().content_source_id == proposal.content_source_id && *e.key() != proposal.id)
            .map(|e| *e.key());
        if let Some(stale_id) = existing_for_source {
            self.proposals.remove(&stale_id);
        }
        self.proposals.insert(proposal.id, proposal);
        Ok(())
    }

    async fn get_by_source(&self, content_source_id: ContentSourceId) -> Result<Option<IntegrationProposal>, CoreError> {
        Ok(self.proposals.iter().find(|e| e.value().content_source_id == content_source_id).map(|e| e.value().clone()))
    }

    async fn get(&self, id: IntegrationProposalId) -> Result<IntegrationProposal, CoreError> {
        self.proposals.get(&id).map(|e| e.clone()).ok_or_else(|| CoreError::not_found(format!("integration proposal {id}")))
    }

    async fn list_for_run(&self, run_id: ResearchRunId) -> Result<Vec<IntegrationProposal>, CoreError> {
        Ok(self.proposals.iter().filter(|e| e.value().research_run_id == run_id).map(|e| e.value().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_contracts::IntegrationStrategy;
    use std::collections::HashMap;

    fn proposal(source_id: ContentSourceId) -> IntegrationProposal {
        IntegrationProposal::new(
            source_id,
            ResearchRunId::new(),
            IntegrationStrategy::Basic,
            HashMap::new(),
            0.5,
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn at_most_one_proposal_survives_per_source() {
        let repo = InMemoryIntegrationProposalRepository::new();
        let source_id = ContentSourceId::new();
        repo.upsert(proposal(source_id)).await.unwrap();
        repo.upsert(proposal(source_id)).await.unwrap();
        assert_eq!(repo.list_for_run(ResearchRunId::new()).await.unwrap().len(), 0);
        assert!(repo.get_by_source(source_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn get_by_source_is_none_for_unknown_source() {
        let repo = InMemoryIntegrationProposalRepository::new();
        assert!(repo.get_by_source(ContentSourceId::new()).await.unwrap().is_none());
    }
}
