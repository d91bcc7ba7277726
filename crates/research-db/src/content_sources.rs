use async_trait::async_trait;
use dashmap::DashMap;
use research_contracts::{ContentSource, ContentSourceId, ContentSourceRepository, CoreError, ResearchRunId};

#[derive(Debug, Default)]
pub struct InMemoryContentSourceRepository {
    sources: DashMap<ContentSourceId, ContentSource>,
}

impl InMemoryContentSourceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentSourceRepository for InMemoryContentSourceRepository {
    async fn insert(&self, source: ContentSource) -> Result<(), CoreError> {
        let collides = self
            .sources
            .iter()
            .any(|e| e.value().research_run_id == source.research_run_id && e.value().content_hash == source.content_hash);
        if collides {
            return Err(CoreError::conflict(format!(
                "content source with hash {} already exists for run {}",
                source.content_hash, source.research_run_id
            )));
        }
        self.sources.insert(source.id, source);
        Ok(())
    }

    async fn get(&self, id: ContentSourceId) -> Result<ContentSource, CoreError> {
        self.sources.get(&id).map(|e| e.clone()).ok_or_else(|| CoreError::not_found(format!("content source {id}")))
    }

    async fn list_for_run(&self, run_id: ResearchRunId) -> Result<Vec<ContentSource>, CoreError> {
        Ok(self.sources.iter().filter(|e| e.value().research_run_id == run_id).map(|e| e.value().clone()).collect())
    }

    async fn find_by_hash(&self, run_id: ResearchRunId, content_hash: &str) -> Result<Option<ContentSource>, CoreError> {
        Ok(self
            .sources
            .iter()
            .find(|e| e.value().research_run_id == run_id && e.value().content_hash == content_hash)
            .map(|e| e.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_contracts::SourceType;

    fn source(run_id: ResearchRunId, canonical: &str) -> ContentSource {
        ContentSource::new(run_id, SourceType::Web, "title", canonical, "search", "tester").unwrap()
    }

    #[tokio::test]
    async fn duplicate_hash_within_a_run_is_rejected() {
        let repo = InMemoryContentSourceRepository::new();
        let run_id = ResearchRunId::new();
        repo.insert(source(run_id, "https://example.org/x")).await.unwrap();
        let dup = source(run_id, "HTTPS://EXAMPLE.ORG/X");
        assert!(repo.insert(dup).await.is_err());
    }

    #[tokio::test]
    async fn same_hash_is_allowed_across_different_runs() {
        let repo = InMemoryContentSourceRepository::new();
        repo.insert(source(ResearchRunId::new(), "https://example.org/x")).await.unwrap();
        repo.insert(source(ResearchRunId::new(), "https://example.org/x")).await.unwrap();
    }

    #[tokio::test]
    async fn find_by_hash_locates_an_existing_source() {
        let repo = InMemoryContentSourceRepository::new();
        let run_id = ResearchRunId::new();
        let s = source(run_id, "https://example.org/x");
        let hash = s.content_hash.clone();
        repo.insert(s).await.unwrap();
        assert!(repo.find_by_hash(run_id, &hash).await.unwrap().is_some());
        assert!(repo.find_by_hash(ResearchRunId::new(), &hash).await.unwrap().is_none());
    }
}
