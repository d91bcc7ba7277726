use async_trait::async_trait;
use dashmap::DashMap;
use research_contracts::{ContentSourceId, CoreError, QualityAssessment, QualityAssessmentId, QualityAssessmentRepository, ResearchRunId};

#[derive(Debug, Default)]
pub struct InMemoryQualityAssessmentRepository {
    assessments: DashMap<QualityAssessmentId, QualityAssessment>,
}

impl InMemoryQualityAssessmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QualityAssessmentRepository for InMemoryQualityAssessmentRepository {
    async fn upsert(&self, assessment: QualityAssessment) -> Result<(), CoreError> {
        let existing_for_source = self
            .assessments
            .iter()
            .find(|e| e.value().content_source_id == assessment.content_source_id && *e.key() != assessment.id)
            .map(|e| *e.key());
        if let Some(stale_id) = existing_for_source {
            self.assessments.remove(&stale_id);
        }
        self.assessments.insert(assessment.id, assessment);
        Ok(())
    }

    async fn get_by_source(&self, content_source_id: ContentSourceId) -> Result<Option<QualityAssessment>, CoreError> {
        Ok(self.assessments.iter().find(|e| e.value().content_source_id == content_source_id).map(|e| e.value().clone()))
    }

    async fn get(&self, id: QualityAssessmentId) -> Result<QualityAssessment, CoreError> {
        self.assessments.get(&id).map(|e| e.clone()).ok_or_else(|| CoreError::not_found(format!("quality assessment {id}")))
    }

    async fn list_for_run(&self, run_id: ResearchRunId) -> Result<Vec<QualityAssessment>, CoreError> {
        Ok(self.assessments.iter().filter(|e| e.value().research_run_id == run_id).map(|e| e.value().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_contracts::AssessmentMethod;

    fn assessment(source_id: ContentSourceId) -> QualityAssessment {
        QualityAssessment::new(
            source_id,
            ResearchRunId::new(),
            0.8,
            0.6,
            0.9,
            0.5,
            "summary",
            "article",
            "rationale",
            AssessmentMethod::Fallback,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn upsert_replaces_any_prior_assessment_for_the_same_source() {
        let repo = InMemoryQualityAssessmentRepository::new();
        let source_id = ContentSourceId::new();
        let first = assessment(source_id);
        let first_id = first.id;
        repo.upsert(first).await.unwrap();
        let second = assessment(source_id);
        repo.upsert(second.clone()).await.unwrap();

        assert!(repo.get(first_id).await.is_err());
        let current = repo.get_by_source(source_id).await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
    }

    #[tokio::test]
    async fn list_for_run_filters_correctly() {
        let repo = InMemoryQualityAssessmentRepository::new();
        let a = assessment(ContentSourceId::new());
        let run_id = a.research_run_id;
        repo.upsert(a).await.unwrap();
        repo.upsert(assessment(ContentSourceId::new())).await.unwrap();
        assert_eq!(repo.list_for_run(run_id).await.unwrap().len(), 1);
    }
}
