use async_trait::async_trait;
use dashmap::DashMap;
use research_contracts::{CoreError, ResearchRun, ResearchRunId, ResearchRunRepository, RunStatus};

#[derive(Debug, Default)]
pub struct InMemoryResearchRunRepository {
    runs: DashMap<ResearchRunId, ResearchRun>,
}

impl InMemoryResearchRunRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResearchRunRepository for InMemoryResearchRunRepository {
    async fn insert(&self, run: ResearchRun) -> Result<(), CoreError> {
        if self.runs.contains_key(&run.id) {
            return Err(CoreError::conflict(format!("research run {} already exists", run.id)));
        }
        self.runs.insert(run.id, run);
        Ok(())
    }

    async fn get(&self, id: ResearchRunId) -> Result<ResearchRun, CoreError> {
        self.runs.get(&id).map(|r| r.clone()).ok_or_else(|| CoreError::not_found(format!("research run {id}")))
    }

    async fn update(&self, run: ResearchRun) -> Result<(), CoreError> {
        if !self.runs.contains_key(&run.id) {
            return Err(CoreError::not_found(format!("research run {}", run.id)));
        }
        self.runs.insert(run.id, run);
        Ok(())
    }

    async fn list(&self, skip: usize, limit: usize) -> Result<Vec<ResearchRun>, CoreError> {
        let mut runs: Vec<ResearchRun> = self.runs.iter().map(|e| e.value().clone()).collect();
        runs.sort_by_key(|r| r.created_at);
        Ok(runs.into_iter().skip(skip).take(limit).collect())
    }

    async fn pending(&self) -> Result<Vec<ResearchRun>, CoreError> {
        Ok(self.runs.iter().filter(|e| e.value().status == RunStatus::Pending).map(|e| e.value().clone()).collect())
    }

    async fn running(&self) -> Result<Vec<ResearchRun>, CoreError> {
        Ok(self.runs.iter().filter(|e| e.value().status == RunStatus::Running).map(|e| e.value().clone()).collect())
    }

    async fn delete(&self, id: ResearchRunId) -> Result<(), CoreError> {
        self.runs.remove(&id).ok_or_else(|| CoreError::not_found(format!("research run {id}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let repo = InMemoryResearchRunRepository::new();
        let run = ResearchRun::new("transformer architectures", "tester").unwrap();
        let id = run.id;
        repo.insert(run).await.unwrap();
        let fetched = repo.get(id).await.unwrap();
        assert_eq!(fetched.id, id);
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let repo = InMemoryResearchRunRepository::new();
        let run = ResearchRun::new("topic", "tester").unwrap();
        repo.insert(run.clone()).await.unwrap();
        assert!(repo.insert(run).await.is_err());
    }

    #[tokio::test]
    async fn pending_and_running_filter_by_status() {
        let repo = InMemoryResearchRunRepository::new();
        let mut a = ResearchRun::new("a", "tester").unwrap();
        let b = ResearchRun::new("b", "tester").unwrap();
        a.start().unwrap();
        repo.insert(a).await.unwrap();
        repo.insert(b).await.unwrap();
        assert_eq!(repo.running().await.unwrap().len(), 1);
        assert_eq!(repo.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_the_run() {
        let repo = InMemoryResearchRunRepository::new();
        let run = ResearchRun::new("topic", "tester").unwrap();
        let id = run.id;
        repo.insert(run).await.unwrap();
        repo.delete(id).await.unwrap();
        assert!(repo.get(id).await.is_err());
    }
}
