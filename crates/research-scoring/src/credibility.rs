//! Credibility sub-scorer: domain reputation + heuristic content signals +
//! source-type prior + metadata author indicators. Grounded on
//! `src/services/scoring/credibility_scorer.py`.

use once_cell::sync::Lazy;
use regex::Regex;
use research_contracts::{ContentSource, SourceType};
use std::collections::HashMap;

const DOMAIN_WEIGHT: f64 = 0.4;
const CONTENT_WEIGHT: f64 = 0.3;
const SOURCE_TYPE_WEIGHT: f64 = 0.2;
const AUTHOR_WEIGHT: f64 = 0.1;

static REPUTABLE_DOMAINS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("wikipedia.org", 0.8),
        ("arxiv.org", 0.9),
        ("nih.gov", 0.9),
        ("nasa.gov", 0.9),
        ("nature.com", 0.8),
        ("science.org", 0.8),
        ("ieee.org", 0.8),
        ("acm.org", 0.8),
    ])
});

static LOW_REPUTATION_DOMAINS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([("blogspot.com", 0.3), ("wordpress.com", 0.4), ("medium.com", 0.4), ("tumblr.com", 0.3)])
});

static CLICKBAIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)you won'?t believe",
        r"(?i)\bshocking\b",
        r"(?i)\bnumber \d+ will\b",
        r"(?i)this one (trick|weird)",
        r"(?i)\bclick here\b",
        r"!{2,}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static clickbait pattern"))
    .collect()
});

fn source_type_prior(source_type: SourceType) -> f64 {
    match source_type {
        SourceType::Academic => 0.9,
        SourceType::News => 0.6,
        SourceType::Web => 0.5,
        SourceType::Other => 0.4,
    }
}

fn tld_default(host: &str) -> f64 {
    if host.ends_with(".edu") {
        0.9
    } else if host.ends_with(".gov") {
        0.9
    } else if host.ends_with(".org") {
        0.7
    } else if host.ends_with(".com") {
        0.5
    } else if host.ends_with(".net") {
        0.5
    } else {
        0.5
    }
}

fn extract_host(url: &str) -> Option<String> {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    let host = without_scheme.split('/').next()?;
    Some(host.trim_start_matches("www.").to_lowercase())
}

fn domain_reputation(source: &ContentSource) -> f64 {
    let Some(url) = &source.url else { return 0.5 };
    let Some(host) = extract_host(url) else { return 0.5 };
    if let Some(score) = REPUTABLE_DOMAINS.get(host.as_str()) {
        return *score;
    }
    if let Some(score) = LOW_REPUTATION_DOMAINS.get(host.as_str()) {
        return *score;
    }
    tld_default(&host)
}

fn content_quality_signal(source: &ContentSource) -> f64 {
    let title = &source.title;
    let mut score: f64 = 0.5;

    let len = title.chars().count();
    if (20..=120).contains(&len) {
        score += 0.2;
    } else if len < 10 {
        score -= 0.2;
    }

    if CLICKBAIT_PATTERNS.iter().any(|re| re.is_match(title)) {
        score -= 0.3;
    }

    let scholarly_markers = ["analysis", "study", "research", "evidence", "methodology", "findings"];
    let lower = title.to_lowercase();
    if scholarly_markers.iter().any(|m| lower.contains(m)) {
        score += 0.15;
    }

    score.clamp(0.0, 1.0)
}

fn author_indicator(source: &ContentSource) -> f64 {
    let has_author = source
        .source_metadata
        .get("author")
        .or_else(|| source.source_metadata.get("authors"))
        .map(|v| !v.is_null())
        .unwrap_or(false);
    if has_author {
        0.8
    } else {
        0.4
    }
}

/// Scores credibility in [0,1]; never fails.
pub fn score_credibility(source: &ContentSource) -> f64 {
    let raw = DOMAIN_WEIGHT * domain_reputation(source)
        + CONTENT_WEIGHT * content_quality_signal(source)
        + SOURCE_TYPE_WEIGHT * source_type_prior(source.source_type)
        + AUTHOR_WEIGHT * author_indicator(source);
    raw.clamp(0.0, 1.0)
}
