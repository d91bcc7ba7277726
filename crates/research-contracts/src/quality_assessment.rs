//! `QualityAssessment`: a four-dimension scored evaluation of a content source.

use crate::common::{now, validate_unit_score, Bag};
use crate::error::CoreError;
use crate::ids::{ContentSourceId, QualityAssessmentId, ResearchRunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weighted-sum coefficients for the composite score. A closed enumeration
/// per the spec, not an open config bag.
pub const CREDIBILITY_WEIGHT: f64 = 0.4;
pub const RELEVANCE_WEIGHT: f64 = 0.3;
pub const FRESHNESS_WEIGHT: f64 = 0.2;
pub const COMPLETENESS_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentMethod {
    AiEnhanced,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub id: QualityAssessmentId,
    pub content_source_id: ContentSourceId,
    pub research_run_id: ResearchRunId,
    pub credibility: f64,
    pub relevance: f64,
    pub freshness: f64,
    pub completeness: f64,
    pub overall: f64,
    pub summary: String,
    pub classification: String,
    pub rationale: String,
    pub method: AssessmentMethod,
    pub assessment_metadata: Bag,
    pub created_at: DateTime<Utc>,
}

/// The composite invariant: `overall = 0.4*cred + 0.3*rel + 0.2*fresh + 0.1*complete`,
/// rounded to two decimals.
pub fn composite_overall(credibility: f64, relevance: f64, freshness: f64, completeness: f64) -> f64 {
    let raw = CREDIBILITY_WEIGHT * credibility
        + RELEVANCE_WEIGHT * relevance
        + FRESHNESS_WEIGHT * freshness
        + COMPLETENESS_WEIGHT * completeness;
    (raw * 100.0).round() / 100.0
}

impl QualityAssessment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        content_source_id: ContentSourceId,
        research_run_id: ResearchRunId,
        credibility: f64,
        relevance: f64,
        freshness: f64,
        completeness: f64,
        summary: impl Into<String>,
        classification: impl Into<String>,
        rationale: impl Into<String>,
        method: AssessmentMethod,
    ) -> Result<Self, CoreError> {
        let credibility = validate_unit_score("credibility", credibility)?;
        let relevance = validate_unit_score("relevance", relevance)?;
        let freshness = validate_unit_score("freshness", freshness)?;
        let completeness = validate_unit_score("completeness", completeness)?;
        let overall = composite_overall(credibility, relevance, freshness, completeness);

        let mut assessment_metadata = Bag::new();
        assessment_metadata.insert(
            "method".to_string(),
            serde_json::json!(match method {
                AssessmentMethod::AiEnhanced => "ai_enhanced",
                AssessmentMethod::Fallback => "fallback",
            }),
        );
        assessment_metadata.insert(
            "weights".to_string(),
            serde_json::json!({
                "credibility": CREDIBILITY_WEIGHT,
                "relevance": RELEVANCE_WEIGHT,
                "freshness": FRESHNESS_WEIGHT,
                "completeness": COMPLETENESS_WEIGHT,
            }),
        );

        Ok(Self {
            id: QualityAssessmentId::new(),
            content_source_id,
            research_run_id,
            credibility,
            relevance,
            freshness,
            completeness,
            overall,
            summary: summary.into(),
            classification: classification.into(),
            rationale: rationale.into(),
            method,
            assessment_metadata,
            created_at: now(),
        })
    }

    /// Re-derives `overall` from the four dimensions; used by the invariant test.
    pub fn recomputed_overall(&self) -> f64 {
        composite_overall(self.credibility, self.relevance, self.freshness, self.completeness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_matches_composite_invariant() {
        let a = QualityAssessment::new(
            ContentSourceId::new(),
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
        .unwrap();
        assert_eq!(a.overall, a.recomputed_overall());
        let hand = ((0.4 * 0.8 + 0.3 * 0.6 + 0.2 * 0.9 + 0.1 * 0.5) * 100.0).round() / 100.0;
        assert_eq!(a.overall, hand);
    }

    #[test]
    fn rejects_out_of_range_score() {
        assert!(QualityAssessment::new(
            ContentSourceId::new(),
            ResearchRunId::new(),
            1.5,
            0.6,
            0.9,
            0.5,
            "s",
            "c",
            "r",
            AssessmentMethod::Fallback,
        )
        .is_err());
    }
}
