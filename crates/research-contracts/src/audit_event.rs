//! `AuditEvent`: an immutable, timestamped, tagged record of something that
//! happened during a run.

use crate::common::{now, Bag};
use crate::ids::{AuditEventId, ResearchRunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventLevel {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    ResearchStart,
    ResearchComplete,
    ContentDiscovery,
    QualityAssessment,
    IntegrationProposal,
    ReviewQueue,
    ReviewDecision,
    SystemEvent,
    Error,
    Recovery,
    Performance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub research_run_id: ResearchRunId,
    pub event_type: EventType,
    pub level: EventLevel,
    pub timestamp: DateTime<Utc>,
    pub payload: Bag,
}

impl AuditEvent {
    pub fn new(
        research_run_id: ResearchRunId,
        event_type: EventType,
        level: EventLevel,
        payload: Bag,
    ) -> Self {
        Self {
            id: AuditEventId::new(),
            research_run_id,
            event_type,
            level,
            timestamp: now(),
            payload,
        }
    }
}
