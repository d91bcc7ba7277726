//! Completeness sub-scorer: length bucket, structural elements, reference
//! patterns, multimedia mentions, methodology mentions. Grounded on
//! `src/services/scoring/completeness_scorer.py`.

use once_cell::sync::Lazy;
use regex::Regex;
use research_contracts::ContentSource;

const LENGTH_WEIGHT: f64 = 0.2;
const STRUCTURE_WEIGHT: f64 = 0.3;
const REFERENCE_WEIGHT: f64 = 0.25;
const MULTIMEDIA_WEIGHT: f64 = 0.15;
const METHODOLOGY_WEIGHT: f64 = 0.1;

const STRUCTURAL_ELEMENTS: &[&str] = &[
    "introduction", "background", "method", "methodology", "results", "findings", "discussion",
    "conclusion", "summary", "abstract", "references", "bibliography", "acknowledgments", "appendix",
];

const MULTIMEDIA_INDICATORS: &[&str] =
    &["figure", "table", "chart", "graph", "image", "diagram", "illustration", "photo", "video", "audio"];

static REFERENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"\[\d+\]", r"\(\w+ et al\.", r"\bdoi:", r"\barXiv:", r"https?://"]
        .iter()
        .map(|p| Regex::new(p).expect("static reference pattern"))
        .collect()
});

fn score_length(text: &str) -> f64 {
    if text.is_empty() {
        return 0.3;
    }
    let word_count = text.split_whitespace().count();
    match word_count {
        n if n >= 2000 => 1.0,
        n if n >= 1000 => 0.8,
        n if n >= 500 => 0.6,
        n if n >= 200 => 0.4,
        n if n >= 100 => 0.3,
        _ => 0.2,
    }
}

fn score_structural_elements(text: &str) -> f64 {
    if text.is_empty() {
        return 0.3;
    }
    let lower = text.to_lowercase();
    let present = STRUCTURAL_ELEMENTS.iter().filter(|e| lower.contains(*e)).count();
    let ratio = present as f64 / STRUCTURAL_ELEMENTS.len() as f64;

    let score = if ratio == 0.0 {
        0.1
    } else if ratio < 0.3 {
        0.3 + ratio * 0.4
    } else if ratio < 0.6 {
        0.5 + (ratio - 0.3) * 0.4
    } else {
        0.7 + (ratio - 0.6) * 0.3
    };
    score.clamp(0.0, 1.0)
}

fn score_reference_presence(text: &str) -> f64 {
    if text.is_empty() {
        return 0.3;
    }
    let count: usize = REFERENCE_PATTERNS.iter().map(|re| re.find_iter(text).count()).sum();
    match count {
        n if n >= 10 => 1.0,
        n if n >= 5 => 0.8,
        n if n >= 3 => 0.6,
        n if n >= 1 => 0.4,
        _ => 0.2,
    }
}

fn score_multimedia(text: &str) -> f64 {
    if text.is_empty() {
        return 0.3;
    }
    let lower = text.to_lowercase();
    let count = MULTIMEDIA_INDICATORS.iter().filter(|m| lower.contains(*m)).count();
    match count {
        n if n >= 3 => 1.0,
        n if n >= 1 => 0.6,
        _ => 0.3,
    }
}

fn score_methodology(text: &str) -> f64 {
    if text.is_empty() {
        return 0.3;
    }
    let lower = text.to_lowercase();
    let markers = ["methodology", "method", "approach", "procedure", "protocol"];
    if markers.iter().any(|m| lower.contains(m)) {
        1.0
    } else {
        0.2
    }
}

/// Scores completeness of `source` in [0,1]; never fails.
pub fn score_completeness(source: &ContentSource) -> f64 {
    let text = source.combined_text();
    let raw = LENGTH_WEIGHT * score_length(&text)
        + STRUCTURE_WEIGHT * score_structural_elements(&text)
        + REFERENCE_WEIGHT * score_reference_presence(&text)
        + MULTIMEDIA_WEIGHT * score_multimedia(&text)
        + METHODOLOGY_WEIGHT * score_methodology(&text);
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_contracts::{ResearchRunId, SourceType};

    fn source(content: &str) -> ContentSource {
        let mut s = ContentSource::new(
            ResearchRunId::new(),
            SourceType::Web,
            "a short title",
            "https://example.org/x",
            "test",
            "tester",
        )
        .unwrap();
        s.content = Some(content.to_string());
        s
    }

    #[test]
    fn thorough_content_scores_higher_than_sparse_content() {
        let thorough = source(&"word ".repeat(2200).to_string().replace("word", "methodology results discussion reference [1] figure"));
        let sparse = source("short");
        assert!(score_completeness(&thorough) > score_completeness(&sparse));
    }

    #[test]
    fn score_is_always_within_unit_range() {
        let s = source("anything");
        let score = score_completeness(&s);
        assert!((0.0..=1.0).contains(&score));
    }
}
