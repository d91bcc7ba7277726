//! `QualityScorer`: composes the four sub-scorers and the optional
//! AI-augmented summary/classification/rationale path behind its own
//! circuit breaker, with deterministic fallbacks.

use crate::completeness::score_completeness;
use crate::credibility::score_credibility;
use crate::fallback::{fallback_classification, fallback_rationale, fallback_summary};
use crate::freshness::score_freshness;
use crate::relevance::score_relevance;
use research_contracts::{AIAdapter, AssessmentMethod, ContentSource, CoreConfig, QualityAssessment, ScoreSet};
use research_resilience::CircuitBreakerRegistry;
use std::sync::Arc;
use tracing::warn;

const AI_BREAKER_SERVICE: &str = "ai-adapter";

pub struct QualityScorer {
    ai_adapter: Option<Arc<dyn AIAdapter>>,
    breakers: Arc<CircuitBreakerRegistry>,
    config: CoreConfig,
}

impl QualityScorer {
    pub fn new(ai_adapter: Option<Arc<dyn AIAdapter>>, breakers: Arc<CircuitBreakerRegistry>, config: CoreConfig) -> Self {
        Self { ai_adapter, breakers, config }
    }

    fn dimensions(&self, source: &ContentSource, topic: &str) -> ScoreSet {
        let credibility = score_credibility(source);
        let relevance = score_relevance(source, topic);
        let freshness = score_freshness(source, topic, &self.config);
        let completeness = score_completeness(source);
        ScoreSet {
            credibility,
            relevance,
            freshness,
            completeness,
            overall: research_contracts::composite_overall(credibility, relevance, freshness, completeness),
        }
    }

    /// Computes the four sub-dimensions, decides between the AI-enhanced and
    /// fallback path, and builds a `QualityAssessment`. Never fails: any AI
    /// failure silently downgrades to the deterministic path.
    pub async fn score(&self, source: &ContentSource, topic: &str) -> Result<QualityAssessment, research_contracts::CoreError> {
        let scores = self.dimensions(source, topic);
        let (method, summary, classification, rationale) = self.narrative(source, &scores).await;

        QualityAssessment::new(
            source.id,
            source.research_run_id,
            scores.credibility,
            scores.relevance,
            scores.freshness,
            scores.completeness,
            summary,
            classification,
            rationale,
            method,
        )
    }

    /// Forces the deterministic path regardless of breaker/adapter state,
    /// used by stage recovery when ASSESS falls back after a failure.
    pub async fn score_with_fallback_only(
        &self,
        source: &ContentSource,
        topic: &str,
    ) -> Result<QualityAssessment, research_contracts::CoreError> {
        let scores = self.dimensions(source, topic);
        let (method, summary, classification, rationale) = self.fallback_narrative(source, &scores);
        QualityAssessment::new(
            source.id,
            source.research_run_id,
            scores.credibility,
            scores.relevance,
            scores.freshness,
            scores.completeness,
            summary,
            classification,
            rationale,
            method,
        )
    }

    async fn narrative(&self, source: &ContentSource, scores: &ScoreSet) -> (AssessmentMethod, String, String, String) {
        let Some(adapter) = &self.ai_adapter else {
            return self.fallback_narrative(source, scores);
        };
        if !self.config.ai_enabled {
            return self.fallback_narrative(source, scores);
        }
        let breaker = self.breakers.get(AI_BREAKER_SERVICE).await;
        if !breaker.can_admit().await {
            return self.fallback_narrative(source, scores);
        }

        let content = source.combined_text();
        let summary = adapter.summarize(&content).await;
        let classification = adapter.classify(&source.title, source.source_type).await;
        let rationale = adapter.rationalize(scores, &content).await;

        match (summary, classification, rationale) {
            (Ok(summary), Ok(classification), Ok(rationale)) => {
                breaker.record_success().await;
                (AssessmentMethod::AiEnhanced, summary, classification, rationale)
            }
            (summary_result, classification_result, rationale_result) => {
                breaker.record_failure().await;
                for result in [&summary_result, &classification_result, &rationale_result] {
                    if let Err(err) = result {
                        warn!(error = %err, "AI adapter call failed, falling back to deterministic path");
                    }
                }
                self.fallback_narrative(source, scores)
            }
        }
    }

    fn fallback_narrative(&self, source: &ContentSource, scores: &ScoreSet) -> (AssessmentMethod, String, String, String) {
        (
            AssessmentMethod::Fallback,
            fallback_summary(source),
            fallback_classification(&source.title, source.source_type),
            fallback_rationale(scores),
        )
    }
}
