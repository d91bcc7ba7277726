use async_trait::async_trait;
use dashmap::DashMap;
use research_contracts::{CoreError, ReviewQueueEntry, ReviewQueueEntryId, ReviewQueueFilter, ReviewQueueRepository};

#[derive(Debug, Default)]
pub struct InMemoryReviewQueueRepository {
    entries: DashMap<ReviewQueueEntryId, ReviewQueueEntry>,
}

impl InMemoryReviewQueueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewQueueRepository for InMemoryReviewQueueRepository {
    async fn insert(&self, entry: ReviewQueueEntry) -> Result<(), CoreError> {
        if self.entries.contains_key(&entry.id) {
            return Err(CoreError::conflict(format!("review queue entry {} already exists", entry.id)));
        }
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    async fn get(&self, id: ReviewQueueEntryId) -> Result<ReviewQueueEntry, CoreError> {
        self.entries.get(&id).map(|e| e.clone()).ok_or_else(|| CoreError::not_found(format!("review queue entry {id}")))
    }

    async fn update(&self, entry: ReviewQueueEntry) -> Result<(), CoreError> {
        if !self.entries.contains_key(&entry.id) {
            return Err(CoreError::not_found(format!("review queue entry {}", entry.id)));
        }
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    async fn list(&self, filter: ReviewQueueFilter) -> Result<Vec<ReviewQueueEntry>, CoreError> {
        Ok(self
            .entries
            .iter()
            .map(|e| e.value().clone())
            .filter(|entry| filter.status.map_or(true, |s| s == entry.status))
            .filter(|entry| filter.research_run_id.map_or(true, |r| r == entry.research_run_id))
            .filter(|entry| {
                filter.assignee.as_deref().map_or(true, |a| entry.assigned_to.as_deref() == Some(a))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_contracts::{ContentSourceId, ResearchRunId, ReviewStatus};

    #[tokio::test]
    async fn list_filters_by_status_and_run() {
        let repo = InMemoryReviewQueueRepository::new();
        let run_id = ResearchRunId::new();
        let mut assigned = ReviewQueueEntry::new(ContentSourceId::new(), run_id, 5);
        assigned.assign("alice").unwrap();
        let pending = ReviewQueueEntry::new(ContentSourceId::new(), run_id, 5);
        let other_run = ReviewQueueEntry::new(ContentSourceId::new(), ResearchRunId::new(), 5);

        repo.insert(assigned).await.unwrap();
        repo.insert(pending).await.unwrap();
        repo.insert(other_run).await.unwrap();

        let filter = ReviewQueueFilter { status: Some(ReviewStatus::Assigned), research_run_id: Some(run_id), assignee: None };
        let results = repo.list(filter).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ReviewStatus::Assigned);
    }

    #[tokio::test]
    async fn update_persists_state_transitions() {
        let repo = InMemoryReviewQueueRepository::new();
        let mut entry = ReviewQueueEntry::new(ContentSourceId::new(), ResearchRunId::new(), 5);
        let id = entry.id;
        repo.insert(entry.clone()).await.unwrap();
        entry.assign("alice").unwrap();
        repo.update(entry).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().status, ReviewStatus::Assigned);
    }
}
