//! `ContentSource`: an external item discovered for a research run.

use crate::common::{now, validate_non_empty, Bag, Provenance};
use crate::error::CoreError;
use crate::ids::{ContentSourceId, ResearchRunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Web,
    Academic,
    News,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSource {
    pub id: ContentSourceId,
    pub research_run_id: ResearchRunId,
    pub source_type: SourceType,
    pub url: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub source_metadata: Bag,
    pub retrieval_method: String,
    pub retrieval_timestamp: DateTime<Utc>,
    pub content_hash: String,
    pub provenance: Provenance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentSource {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        research_run_id: ResearchRunId,
        source_type: SourceType,
        title: impl Into<String>,
        canonical_identifier: &str,
        retrieval_method: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let title = title.into();
        validate_non_empty("title", &title)?;
        validate_non_empty("canonical_identifier", canonical_identifier)?;
        let ts = now();
        Ok(Self {
            id: ContentSourceId::new(),
            research_run_id,
            source_type,
            url: None,
            title,
            description: None,
            content: None,
            source_metadata: Bag::new(),
            retrieval_method: retrieval_method.into(),
            retrieval_timestamp: ts,
            content_hash: content_hash(canonical_identifier),
            provenance: Provenance::new(created_by),
            created_at: ts,
            updated_at: ts,
        })
    }

    /// Combined text used for scoring and embedding: title + description +
    /// a content excerpt, matching the spec's "title+description+excerpt"
    /// input to the embedder.
    pub fn combined_text(&self) -> String {
        let mut parts = vec![self.title.clone()];
        if let Some(desc) = &self.description {
            parts.push(desc.clone());
        }
        if let Some(content) = &self.content {
            parts.push(content.chars().take(2000).collect());
        }
        parts.join(" ")
    }
}

/// SHA-256 of the normalized external identifier, used as the dedup key.
/// Normalization lowercases and trims the identifier so trivially distinct
/// strings that name the same resource still collide.
pub fn content_hash(canonical_identifier: &str) -> String {
    let normalized = canonical_identifier.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_identifier_hashes_equal_regardless_of_case_or_whitespace() {
        let a = content_hash("https://example.org/x");
        let b = content_hash("  HTTPS://EXAMPLE.ORG/X  ");
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_empty_title() {
        let run_id = ResearchRunId::new();
        assert!(ContentSource::new(
            run_id,
            SourceType::Web,
            "",
            "https://example.org/x",
            "search",
            "tester"
        )
        .is_err());
    }
}
