//! `IntegrationProposal`: a plan for merging an approved content source into
//! the knowledge graph.

use crate::common::{now, validate_unit_score};
use crate::error::CoreError;
use crate::ids::{ContentSourceId, IntegrationProposalId, ResearchRunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationStrategy {
    Basic,
    Standard,
    Deep,
    Comprehensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimatedEffort {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    PendingReview,
    Approved,
    Rejected,
    Implemented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionKind {
    Direct,
    Thematic,
    Contextual,
    Loose,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedConnection {
    pub target_id: ContentSourceId,
    pub kind: ConnectionKind,
    pub strength: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedTag {
    pub tag: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationProposal {
    pub id: IntegrationProposalId,
    pub content_source_id: ContentSourceId,
    pub research_run_id: ResearchRunId,
    pub strategy: IntegrationStrategy,
    pub proposed_actions: HashMap<String, bool>,
    pub estimated_effort: EstimatedEffort,
    pub confidence: f64,
    pub suggested_connections: Vec<SuggestedConnection>,
    pub suggested_tags: Vec<SuggestedTag>,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Action kinds considered when computing `estimated_effort`, matching the
/// original's `proposed_actions` bag — a closed set here rather than an
/// arbitrary string map.
pub const ACTION_KINDS: &[&str] = &[
    "create_node",
    "create_connections",
    "add_tags",
    "update_metadata",
    "create_summary",
    "notify_reviewers",
];

pub fn estimate_effort(enabled_action_count: usize) -> EstimatedEffort {
    match enabled_action_count {
        0..=3 => EstimatedEffort::Low,
        4..=6 => EstimatedEffort::Medium,
        _ => EstimatedEffort::High,
    }
}

impl IntegrationProposal {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        content_source_id: ContentSourceId,
        research_run_id: ResearchRunId,
        strategy: IntegrationStrategy,
        proposed_actions: HashMap<String, bool>,
        confidence: f64,
        suggested_connections: Vec<SuggestedConnection>,
        suggested_tags: Vec<SuggestedTag>,
    ) -> Result<Self, CoreError> {
        let confidence = validate_unit_score("confidence", confidence)?;
        for connection in &suggested_connections {
            if connection.target_id == content_source_id {
                return Err(CoreError::invalid_argument(
                    "a content source cannot suggest a connection to itself",
                ));
            }
        }
        let enabled = proposed_actions.values().filter(|v| **v).count();
        let ts = now();
        Ok(Self {
            id: IntegrationProposalId::new(),
            content_source_id,
            research_run_id,
            strategy,
            proposed_actions,
            estimated_effort: estimate_effort(enabled),
            confidence,
            suggested_connections,
            suggested_tags,
            status: ProposalStatus::PendingReview,
            created_at: ts,
            updated_at: ts,
        })
    }

    /// Review approval only transitions status — the proposal itself was
    /// already generated once during PROPOSE (see spec.md §9: the source
    /// created proposals twice; this consolidates to one generation).
    pub fn approve(&mut self) -> Result<(), CoreError> {
        if self.status != ProposalStatus::PendingReview {
            return Err(CoreError::conflict(format!(
                "proposal {} is not PENDING_REVIEW (status={:?})",
                self.id, self.status
            )));
        }
        self.status = ProposalStatus::Approved;
        self.updated_at = now();
        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), CoreError> {
        if self.status != ProposalStatus::PendingReview {
            return Err(CoreError::conflict(format!(
                "proposal {} is not PENDING_REVIEW (status={:?})",
                self.id, self.status
            )));
        }
        self.status = ProposalStatus::Rejected;
        self.updated_at = now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_self_referential_connection() {
        let cs = ContentSourceId::new();
        let connection = SuggestedConnection {
            target_id: cs,
            kind: ConnectionKind::Direct,
            strength: 1.0,
            rationale: "self".into(),
        };
        let result = IntegrationProposal::new(
            cs,
            ResearchRunId::new(),
            IntegrationStrategy::Basic,
            HashMap::new(),
            0.5,
            vec![connection],
            vec![],
        );
        assert!(result.is_err());
    }

    #[test]
    fn effort_buckets_match_action_count() {
        assert_eq!(estimate_effort(0), EstimatedEffort::Low);
        assert_eq!(estimate_effort(3), EstimatedEffort::Low);
        assert_eq!(estimate_effort(4), EstimatedEffort::Medium);
        assert_eq!(estimate_effort(6), EstimatedEffort::Medium);
        assert_eq!(estimate_effort(7), EstimatedEffort::High);
    }
}
