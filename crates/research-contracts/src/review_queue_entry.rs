//! `ReviewQueueEntry`: the unit of human adjudication over proposals.
//!
//! Unifies the original's two overlapping entities (`ReviewQueue` and
//! `ResearchReviewQueue`) into one type, per spec.md §9.

use crate::common::now;
use crate::error::CoreError;
use crate::ids::{ContentSourceId, ResearchRunId, ReviewQueueEntryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    Pending,
    Assigned,
    Approved,
    Rejected,
    Escalated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDecision {
    Approve,
    Reject,
    Escalate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewNote {
    pub author: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewQueueEntry {
    pub id: ReviewQueueEntryId,
    pub content_source_id: ContentSourceId,
    pub research_run_id: ResearchRunId,
    pub assigned_to: Option<String>,
    pub priority: i32,
    pub status: ReviewStatus,
    pub review_notes: Vec<ReviewNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set the moment an assignee is attached; used by metrics instead of
    /// `updated_at`, which would also move on unrelated edits.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Set the moment a terminal decision (approve/reject) lands.
    pub decided_at: Option<DateTime<Utc>>,
}

impl ReviewQueueEntry {
    pub fn new(
        content_source_id: ContentSourceId,
        research_run_id: ResearchRunId,
        priority: i32,
    ) -> Self {
        let ts = now();
        Self {
            id: ReviewQueueEntryId::new(),
            content_source_id,
            research_run_id,
            assigned_to: None,
            priority,
            status: ReviewStatus::Pending,
            review_notes: Vec::new(),
            created_at: ts,
            updated_at: ts,
            assigned_at: None,
            decided_at: None,
        }
    }

    fn add_note(&mut self, author: impl Into<String>, text: impl Into<String>) {
        self.review_notes.push(ReviewNote {
            author: author.into(),
            text: text.into(),
            at: now(),
        });
    }

    /// PENDING -> ASSIGNED, or ESCALATED -> ASSIGNED with a new assignee.
    pub fn assign(&mut self, assignee: impl Into<String>) -> Result<(), CoreError> {
        match self.status {
            ReviewStatus::Pending => {
                let assignee = assignee.into();
                self.add_note("system", format!("assigned to {assignee}"));
                self.assigned_to = Some(assignee);
            }
            ReviewStatus::Escalated => {
                let assignee = assignee.into();
                let previous = self.assigned_to.clone().unwrap_or_else(|| "unassigned".to_string());
                self.add_note(
                    "system",
                    format!("reassigned from {previous} to {assignee}"),
                );
                self.assigned_to = Some(assignee);
            }
            other => {
                return Err(CoreError::conflict(format!(
                    "entry {} cannot be assigned from status {other:?}",
                    self.id
                )));
            }
        }
        self.status = ReviewStatus::Assigned;
        self.assigned_at = Some(now());
        self.updated_at = now();
        Ok(())
    }

    pub fn decide(
        &mut self,
        decision: ReviewDecision,
        author: impl Into<String>,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        if self.status != ReviewStatus::Assigned {
            return Err(CoreError::conflict(format!(
                "entry {} must be ASSIGNED to decide (status={:?})",
                self.id, self.status
            )));
        }
        let author = author.into();
        match decision {
            ReviewDecision::Approve => {
                self.status = ReviewStatus::Approved;
                self.decided_at = Some(now());
                if let Some(text) = notes {
                    self.add_note(author, text);
                }
            }
            ReviewDecision::Reject => {
                self.status = ReviewStatus::Rejected;
                self.decided_at = Some(now());
                if let Some(text) = notes {
                    self.add_note(author, text);
                }
            }
            ReviewDecision::Escalate => {
                let reason = notes.ok_or_else(|| {
                    CoreError::invalid_argument("escalation requires a non-empty reason")
                })?;
                if reason.trim().is_empty() {
                    return Err(CoreError::invalid_argument(
                        "escalation requires a non-empty reason",
                    ));
                }
                self.status = ReviewStatus::Escalated;
                self.add_note(author, format!("escalated: {reason}"));
            }
        }
        self.updated_at = now();
        Ok(())
    }
}

/// `priority = round(10 * overall)` if an assessment exists, else 5.
pub fn priority_from_overall(overall: Option<f64>) -> i32 {
    match overall {
        Some(overall) => (10.0 * overall).round() as i32,
        None => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_requires_reason() {
        let mut entry = ReviewQueueEntry::new(ContentSourceId::new(), ResearchRunId::new(), 5);
        entry.assign("alice").unwrap();
        assert!(entry.decide(ReviewDecision::Escalate, "alice", None).is_err());
        entry
            .decide(ReviewDecision::Escalate, "alice", Some("needs second opinion".into()))
            .unwrap();
        assert_eq!(entry.status, ReviewStatus::Escalated);
        assert!(entry.review_notes.last().unwrap().text.starts_with("escalated:"));
    }

    #[test]
    fn escalated_can_be_reassigned() {
        let mut entry = ReviewQueueEntry::new(ContentSourceId::new(), ResearchRunId::new(), 5);
        entry.assign("alice").unwrap();
        entry
            .decide(ReviewDecision::Escalate, "alice", Some("reason".into()))
            .unwrap();
        entry.assign("bob").unwrap();
        assert_eq!(entry.status, ReviewStatus::Assigned);
        assert_eq!(entry.assigned_to.as_deref(), Some("bob"));
        assert!(entry
            .review_notes
            .iter()
            .any(|n| n.text.contains("reassigned from alice to bob")));
    }

    #[test]
    fn priority_defaults_to_five_without_assessment() {
        assert_eq!(priority_from_overall(None), 5);
        assert_eq!(priority_from_overall(Some(0.87)), 9);
    }
}
