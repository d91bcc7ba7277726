//! Tag suggestion: keyword frequency + semantic-neighbor tags + context tags
//! + a small prior list, deduplicated by max confidence and ranked by
//! category weight + positional boost + specificity. Grounded on
//! `src/services/integration/tag_suggester.py`.

use once_cell::sync::Lazy;
use research_contracts::{SimilarityMatch, SourceType, SuggestedTag};
use std::collections::{HashMap, HashSet};

const PRIOR_TAGS: &[&str] = &["research", "knowledge-base", "reference"];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "as", "is",
        "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
        "could", "should", "may", "might", "can", "this", "that", "these", "those",
    ])
});

struct TagCategory {
    name: &'static str,
    patterns: &'static [&'static str],
    weight: f64,
}

static TAG_CATEGORIES: &[TagCategory] = &[
    TagCategory { name: "topic", patterns: &["topic", "subject", "theme", "domain", "field"], weight: 1.0 },
    TagCategory { name: "methodology", patterns: &["method", "approach", "technique", "framework", "model"], weight: 0.8 },
    TagCategory { name: "technology", patterns: &["technology", "tool", "software", "platform", "system"], weight: 0.9 },
    TagCategory { name: "concept", patterns: &["concept", "principle", "theory", "idea", "notion"], weight: 0.7 },
    TagCategory { name: "application", patterns: &["application", "use case", "implementation", "deployment"], weight: 0.6 },
];

fn category_weight(tag: &str) -> f64 {
    let lower = tag.to_lowercase();
    TAG_CATEGORIES
        .iter()
        .find(|c| c.patterns.iter().any(|p| lower.contains(p)))
        .map(|c| c.weight)
        .unwrap_or(0.5)
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w.as_str()))
        .collect()
}

fn keyword_tags(combined_text: &str) -> HashMap<String, f64> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for token in tokenize(combined_text) {
        *freq.entry(token).or_insert(0) += 1;
    }
    freq.into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(tag, count)| (tag, (count as f64 / 10.0).min(1.0)))
        .collect()
}

fn semantic_tags(neighbors: &[SimilarityMatch]) -> HashMap<String, f64> {
    let mut tags: HashMap<String, f64> = HashMap::new();
    for neighbor in neighbors {
        for tag in &neighbor.tags {
            let entry = tags.entry(tag.to_lowercase()).or_insert(0.0);
            *entry = entry.max(neighbor.similarity);
        }
    }
    tags
}

fn context_tags(source_type: SourceType) -> HashMap<String, f64> {
    let tag = match source_type {
        SourceType::Academic => "academic",
        SourceType::News => "news",
        SourceType::Web => "web",
        SourceType::Other => "general",
    };
    HashMap::from([(tag.to_string(), 0.6)])
}

fn position_boost(tag: &str, title: &str, description: &str) -> f64 {
    if title.to_lowercase().contains(tag) {
        0.2
    } else if description.to_lowercase().contains(tag) {
        0.1
    } else {
        0.0
    }
}

fn specificity(tag: &str) -> f64 {
    (tag.split_whitespace().count() as f64 * 0.05).min(0.2)
}

/// Combines keyword, semantic-neighbor, context, and prior tag sources,
/// deduplicates by max confidence, scores, and returns the top `limit`.
pub fn suggest_tags(
    title: &str,
    description: &str,
    combined_text: &str,
    source_type: SourceType,
    neighbors: &[SimilarityMatch],
    limit: usize,
) -> Vec<SuggestedTag> {
    let mut candidates: HashMap<String, f64> = HashMap::new();

    for (tag, confidence) in keyword_tags(combined_text) {
        let entry = candidates.entry(tag).or_insert(0.0);
        *entry = entry.max(confidence);
    }
    for (tag, confidence) in semantic_tags(neighbors) {
        let entry = candidates.entry(tag).or_insert(0.0);
        *entry = entry.max(confidence);
    }
    for (tag, confidence) in context_tags(source_type) {
        let entry = candidates.entry(tag).or_insert(0.0);
        *entry = entry.max(confidence);
    }
    for tag in PRIOR_TAGS {
        let entry = candidates.entry(tag.to_string()).or_insert(0.0);
        *entry = entry.max(0.3);
    }

    let mut scored: Vec<SuggestedTag> = candidates
        .into_iter()
        .map(|(tag, base_confidence)| {
            let score = (category_weight(&tag) + position_boost(&tag, title, description) + specificity(&tag))
                .min(1.0)
                .max(base_confidence);
            SuggestedTag { tag, confidence: score.min(1.0) }
        })
        .collect();

    scored.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
