//! Connection-suggestion from vector-store neighbors: similarity bands,
//! strength multipliers, and rationale text. Grounded on
//! `src/services/integration/connection_suggester.py`.

use research_contracts::{ConnectionKind, SimilarityMatch, SuggestedConnection};

fn connection_kind(similarity: f64) -> ConnectionKind {
    if similarity >= 0.8 {
        ConnectionKind::Direct
    } else if similarity >= 0.6 {
        ConnectionKind::Thematic
    } else if similarity >= 0.4 {
        ConnectionKind::Contextual
    } else {
        ConnectionKind::Loose
    }
}

fn strength_multiplier(kind: ConnectionKind) -> f64 {
    match kind {
        ConnectionKind::Direct => 1.2,
        ConnectionKind::Thematic => 1.0,
        ConnectionKind::Contextual => 0.8,
        ConnectionKind::Loose => 0.6,
    }
}

fn rationale(source_title: &str, neighbor_title: &str, kind: ConnectionKind, similarity: f64) -> String {
    match kind {
        ConnectionKind::Direct => format!(
            "High semantic similarity ({similarity:.2}) suggests {source_title} is directly related to {neighbor_title}"
        ),
        ConnectionKind::Thematic => format!(
            "Strong thematic alignment ({similarity:.2}) indicates {source_title} shares core themes with {neighbor_title}"
        ),
        ConnectionKind::Contextual => format!(
            "Moderate similarity ({similarity:.2}) suggests {source_title} provides relevant context for {neighbor_title}"
        ),
        ConnectionKind::Loose => format!(
            "Basic similarity ({similarity:.2}) indicates a possible loose connection between {source_title} and {neighbor_title}"
        ),
    }
}

/// Builds one ranked `SuggestedConnection` per neighbor, highest strength first.
pub fn suggest_connections(source_title: &str, neighbors: &[SimilarityMatch]) -> Vec<SuggestedConnection> {
    let mut suggestions: Vec<SuggestedConnection> = neighbors
        .iter()
        .filter_map(|neighbor| {
            let target_id = neighbor.id.parse().ok()?;
            let kind = connection_kind(neighbor.similarity);
            let strength = (neighbor.similarity * strength_multiplier(kind)).min(1.0);
            let neighbor_title = neighbor.title.clone().unwrap_or_else(|| "the target content".to_string());
            Some(SuggestedConnection {
                target_id,
                kind,
                strength,
                rationale: rationale(source_title, &neighbor_title, kind, neighbor.similarity),
            })
        })
        .collect();
    suggestions.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(std::cmp::Ordering::Equal));
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_contracts::ContentSourceId;

    fn neighbor(similarity: f64) -> SimilarityMatch {
        SimilarityMatch { id: ContentSourceId::new().to_string(), similarity, title: Some("neighbor".into()), tags: vec![] }
    }

    #[test]
    fn bands_map_to_expected_connection_kinds() {
        assert!(matches!(connection_kind(0.9), ConnectionKind::Direct));
        assert!(matches!(connection_kind(0.65), ConnectionKind::Thematic));
        assert!(matches!(connection_kind(0.45), ConnectionKind::Contextual));
        assert!(matches!(connection_kind(0.1), ConnectionKind::Loose));
    }

    #[test]
    fn suggestions_are_sorted_by_strength_descending() {
        let neighbors = vec![neighbor(0.3), neighbor(0.9), neighbor(0.6)];
        let suggestions = suggest_connections("source", &neighbors);
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[0].strength >= suggestions[1].strength);
        assert!(suggestions[1].strength >= suggestions[2].strength);
    }

    #[test]
    fn direct_strength_can_exceed_similarity_but_is_capped_at_one() {
        let suggestions = suggest_connections("source", &[neighbor(0.95)]);
        assert!(suggestions[0].strength <= 1.0);
    }
}
