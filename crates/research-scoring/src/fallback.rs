//! Deterministic fallbacks for the AI-augmented summary/classification/
//! rationale, used when the AI adapter is absent, its breaker is open, or it
//! fails. Grounded on `src/services/ai/{summarizer,classifier,
//! quality_rationale}.py`'s documented fallback behavior.

use research_contracts::{ContentSource, ScoreSet, SourceType};

const NO_DESCRIPTION_STOCK_PHRASE: &str = "No description available for";

pub fn fallback_summary(source: &ContentSource) -> String {
    match &source.description {
        Some(description) if !description.trim().is_empty() => description.clone(),
        _ => format!("{NO_DESCRIPTION_STOCK_PHRASE} {}", source.title),
    }
}

/// Pattern-matches title/source-type against a fixed topic/type table.
pub fn fallback_classification(title: &str, source_type: SourceType) -> String {
    let lower = title.to_lowercase();
    let topic_table: &[(&str, &str)] = &[
        ("machine learning", "ai_ml"),
        ("neural network", "ai_ml"),
        ("artificial intelligence", "ai_ml"),
        ("security", "cybersecurity"),
        ("vulnerability", "cybersecurity"),
        ("cloud", "cloud_computing"),
        ("climate", "environment"),
        ("election", "politics"),
        ("market", "finance"),
    ];
    for (needle, label) in topic_table {
        if lower.contains(needle) {
            return label.to_string();
        }
    }
    match source_type {
        SourceType::Academic => "academic_general".to_string(),
        SourceType::News => "news_general".to_string(),
        SourceType::Web => "web_general".to_string(),
        SourceType::Other => "uncategorized".to_string(),
    }
}

/// Assembles a deterministic textual report of the sub-scores.
pub fn fallback_rationale(scores: &ScoreSet) -> String {
    format!(
        "Deterministic assessment: credibility={:.2}, relevance={:.2}, freshness={:.2}, completeness={:.2}, overall={:.2}.",
        scores.credibility, scores.relevance, scores.freshness, scores.completeness, scores.overall
    )
}
