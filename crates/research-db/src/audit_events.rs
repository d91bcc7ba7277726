use async_trait::async_trait;
use parking_lot::RwLock;
use research_contracts::{AuditEvent, AuditEventRepository, CoreError, ResearchRunId};

/// Append-only log backed by a single `RwLock<Vec<_>>` rather than a
/// `DashMap`: ordering within a run must be preserved exactly as appended,
/// which a hash-sharded map cannot guarantee as cheaply.
#[derive(Debug, Default)]
pub struct InMemoryAuditEventRepository {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditEventRepository for InMemoryAuditEventRepository {
    async fn append(&self, event: AuditEvent) -> Result<(), CoreError> {
        self.events.write().push(event);
        Ok(())
    }

    async fn timeline(&self, run_id: ResearchRunId) -> Result<Vec<AuditEvent>, CoreError> {
        Ok(self.events.read().iter().filter(|e| e.research_run_id == run_id).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_contracts::{Bag, EventLevel, EventType};

    #[tokio::test]
    async fn timeline_preserves_append_order() {
        let repo = InMemoryAuditEventRepository::new();
        let run_id = ResearchRunId::new();
        let first = AuditEvent::new(run_id, EventType::ResearchStart, EventLevel::Info, Bag::new());
        let second = AuditEvent::new(run_id, EventType::ContentDiscovery, EventLevel::Info, Bag::new());
        let first_id = first.id;
        let second_id = second.id;
        repo.append(first).await.unwrap();
        repo.append(second).await.unwrap();

        let timeline = repo.timeline(run_id).await.unwrap();
        assert_eq!(timeline[0].id, first_id);
        assert_eq!(timeline[1].id, second_id);
    }

    #[tokio::test]
    async fn timeline_excludes_other_runs() {
        let repo = InMemoryAuditEventRepository::new();
        repo.append(AuditEvent::new(ResearchRunId::new(), EventType::ResearchStart, EventLevel::Info, Bag::new()))
            .await
            .unwrap();
        let other_run = ResearchRunId::new();
        assert!(repo.timeline(other_run).await.unwrap().is_empty());
    }
}
