//! Relevance sub-scorer: keyword overlap + string similarity + topic
//! indicator match + depth heuristics. Grounded on
//! `src/services/scoring/relevance_scorer.py`.

use once_cell::sync::Lazy;
use research_contracts::ContentSource;
use std::collections::HashSet;

const KEYWORD_WEIGHT: f64 = 0.4;
const SIMILARITY_WEIGHT: f64 = 0.3;
const TOPIC_WEIGHT: f64 = 0.2;
const DEPTH_WEIGHT: f64 = 0.1;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
        "are", "was", "were", "be", "been", "being",
    ])
});

fn extract_keywords(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() >= 3 && !STOP_WORDS.contains(w.as_str()))
        .collect()
}

fn score_keyword_matching(combined: &str, topic: &str) -> f64 {
    let keywords = extract_keywords(topic);
    if keywords.is_empty() {
        return 0.5;
    }
    let lower = combined.to_lowercase();
    let matches = keywords.iter().filter(|k| lower.contains(k.as_str())).count();
    let ratio = matches as f64 / keywords.len() as f64;

    if ratio == 0.0 {
        0.1
    } else if ratio < 0.3 {
        0.3 + ratio * 0.4
    } else if ratio < 0.7 {
        0.5 + (ratio - 0.3) * 0.4
    } else {
        0.7 + (ratio - 0.7) * 0.3
    }
    .clamp(0.0, 1.0)
}

fn score_semantic_similarity(combined: &str, topic: &str) -> f64 {
    let similarity = strsim::jaro(&topic.to_lowercase(), &combined.to_lowercase());
    if similarity < 0.1 {
        0.1
    } else if similarity < 0.3 {
        0.3 + (similarity - 0.1) * 0.7
    } else {
        0.7 + (similarity - 0.3) * 0.3
    }
    .clamp(0.0, 1.0)
}

fn score_topic_alignment(combined: &str, topic: &str) -> f64 {
    let topic_norm = topic.to_lowercase();
    let indicators = extract_keywords(combined);
    if indicators.is_empty() {
        return 0.3;
    }
    let mut overlap = 0.0;
    for indicator in indicators.iter().take(50) {
        if topic_norm.contains(indicator.as_str()) || indicator.contains(topic_norm.as_str()) {
            overlap += 0.2;
        } else if strsim::jaro(&topic_norm, indicator) > 0.6 {
            overlap += 0.1;
        }
    }
    overlap.clamp(0.0, 1.0)
}

fn score_content_depth(combined: &str) -> f64 {
    let mut score: f64 = 0.5;
    let word_count = combined.split_whitespace().count();
    if word_count > 1000 {
        score += 0.2;
    } else if word_count > 500 {
        score += 0.1;
    } else if word_count < 100 {
        score -= 0.2;
    }

    let depth_indicators =
        ["methodology", "analysis", "results", "discussion", "conclusion", "experiment", "study", "research", "findings", "data"];
    let lower = combined.to_lowercase();
    let found = depth_indicators.iter().filter(|i| lower.contains(*i)).count();
    if found >= 3 {
        score += 0.3;
    } else if found >= 1 {
        score += 0.1;
    }
    score.clamp(0.0, 1.0)
}

/// Scores relevance of `source` to `topic` in [0,1]; never fails.
pub fn score_relevance(source: &ContentSource, topic: &str) -> f64 {
    let combined = source.combined_text();
    let raw = KEYWORD_WEIGHT * score_keyword_matching(&combined, topic)
        + SIMILARITY_WEIGHT * score_semantic_similarity(&combined, topic)
        + TOPIC_WEIGHT * score_topic_alignment(&combined, topic)
        + DEPTH_WEIGHT * score_content_depth(&combined);
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_contracts::{ResearchRunId, SourceType};

    fn source(title: &str, description: &str) -> ContentSource {
        let mut s = ContentSource::new(
            ResearchRunId::new(),
            SourceType::Web,
            title,
            "https://example.org/x",
            "test",
            "tester",
        )
        .unwrap();
        s.description = Some(description.to_string());
        s
    }

    #[test]
    fn on_topic_source_scores_higher_than_off_topic() {
        let on_topic = source(
            "Transformer architectures in deep learning",
            "A methodology analysis of neural network training and results",
        );
        let off_topic = source("Gardening tips for spring", "How to plant tomatoes");
        assert!(score_relevance(&on_topic, "transformer architectures") > score_relevance(&off_topic, "transformer architectures"));
    }

    #[test]
    fn score_is_always_within_unit_range() {
        let s = source("x", "y");
        let score = score_relevance(&s, "anything");
        assert!((0.0..=1.0).contains(&score));
    }
}
