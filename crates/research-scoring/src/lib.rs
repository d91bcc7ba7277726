//! Four-dimension content quality scoring with an AI-augmented narrative
//! path and deterministic fallbacks.

pub mod completeness;
pub mod credibility;
pub mod fallback;
pub mod freshness;
pub mod relevance;
pub mod scorer;

pub use completeness::score_completeness;
pub use credibility::score_credibility;
pub use fallback::{fallback_classification, fallback_rationale, fallback_summary};
pub use freshness::score_freshness;
pub use relevance::score_relevance;
pub use scorer::QualityScorer;
