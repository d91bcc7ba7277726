//! Freshness sub-scorer: publication age against a topic-specific
//! requirement, decaying linearly then exponentially past it. Grounded on
//! `src/services/scoring/freshness_scorer.py`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use research_contracts::{now, CoreConfig};

const FLOOR: f64 = 0.1;

/// Alternate formats tolerated beyond RFC3339, in the order the original
/// scorer tries them.
const ALTERNATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%d %B %Y",
];

fn parse_published_at(source: &research_contracts::ContentSource) -> Option<DateTime<Utc>> {
    let raw = source.source_metadata.get("published_at")?;
    if let Ok(parsed) = serde_json::from_value::<DateTime<Utc>>(raw.clone()) {
        return Some(parsed);
    }

    let date_str = raw.as_str()?;
    for format in ALTERNATE_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(date_str, format) {
            return Some(Utc.from_utc_datetime(&datetime));
        }
        if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }
    None
}

/// Score is 1.0 at or before the requirement, decaying linearly to the
/// requirement's 2x point, then exponentially beyond that, floored at 0.1.
/// Missing publication date yields a neutral 0.5.
pub fn score_freshness(source: &research_contracts::ContentSource, topic: &str, config: &CoreConfig) -> f64 {
    let Some(published_at) = parse_published_at(source) else { return 0.5 };
    let age_days = (now() - published_at).num_days().max(0) as f64;
    let requirement = config.freshness_requirement_days(topic) as f64;

    if age_days <= requirement {
        return 1.0;
    }

    let linear_window = requirement; // linear decay over one more requirement-length window
    let linear_end = requirement + linear_window;
    if age_days <= linear_end {
        let fraction = (age_days - requirement) / linear_window;
        return (1.0 - fraction * 0.5).clamp(FLOOR, 1.0);
    }

    let overshoot = (age_days - linear_end) / requirement.max(1.0);
    let decayed = 0.5 * (-overshoot).exp();
    decayed.max(FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use research_contracts::{ContentSource, ResearchRunId, SourceType};

    fn source_with_age(days_old: i64) -> ContentSource {
        let mut s = ContentSource::new(
            ResearchRunId::new(),
            SourceType::Web,
            "title",
            "https://example.org/x",
            "test",
            "tester",
        )
        .unwrap();
        let published = now() - Duration::days(days_old);
        s.source_metadata.insert("published_at".to_string(), serde_json::json!(published));
        s
    }

    #[test]
    fn missing_date_yields_neutral_score() {
        let s = ContentSource::new(
            ResearchRunId::new(),
            SourceType::Web,
            "title",
            "https://example.org/x",
            "test",
            "tester",
        )
        .unwrap();
        assert_eq!(score_freshness(&s, "news", &CoreConfig::default()), 0.5);
    }

    #[test]
    fn within_requirement_scores_perfect() {
        let s = source_with_age(3);
        assert_eq!(score_freshness(&s, "news", &CoreConfig::default()), 1.0);
    }

    #[test]
    fn tolerates_a_plain_date_instead_of_rfc3339() {
        let mut s = ContentSource::new(
            ResearchRunId::new(),
            SourceType::Web,
            "title",
            "https://example.org/x",
            "test",
            "tester",
        )
        .unwrap();
        s.source_metadata.insert("published_at".to_string(), serde_json::json!("2020-01-15"));
        assert!(score_freshness(&s, "history", &CoreConfig::default()) > FLOOR);
    }

    #[test]
    fn score_decays_as_content_ages_past_requirement() {
        let config = CoreConfig::default();
        let recent = source_with_age(10);
        let old = source_with_age(400);
        assert!(score_freshness(&recent, "news", &config) > score_freshness(&old, "news", &config));
        assert!(score_freshness(&old, "news", &config) >= FLOOR);
    }
}
