//! Append-only audit log: timeline, statistics, and report queries over
//! `AuditEvent`s. Grounded on `src/services/audit/research_audit.py`'s
//! synchronous-commit pattern — `append` is awaited before the caller
//! proceeds, so there is no buffering between "recorded" and "durable".

use research_contracts::{AuditEvent, AuditEventRepository, CoreError, EventLevel, EventType, ResearchRunId};
use std::collections::HashMap;
use std::sync::Arc;

/// Counts by event type and by level for a run's timeline.
#[derive(Debug, Clone, Default)]
pub struct AuditStatistics {
    pub by_event_type: HashMap<String, u64>,
    pub by_level: HashMap<String, u64>,
    pub total_events: u64,
}

/// Human-facing rollup of a run's audit trail.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub total_events: u64,
    pub error_rate: f64,
    pub warning_rate: f64,
    pub duration: Option<chrono::Duration>,
    pub last_critical_events: Vec<AuditEvent>,
}

const LAST_CRITICAL_LIMIT: usize = 10;

pub struct AuditLog {
    repository: Arc<dyn AuditEventRepository>,
}

impl AuditLog {
    pub fn new(repository: Arc<dyn AuditEventRepository>) -> Self {
        Self { repository }
    }

    /// Durable-before-ack: the caller only gets `Ok` after the repository
    /// write has completed.
    pub async fn append(&self, event: AuditEvent) -> Result<(), CoreError> {
        self.repository.append(event).await
    }

    pub async fn timeline(&self, run_id: ResearchRunId) -> Result<Vec<AuditEvent>, CoreError> {
        let mut events = self.repository.timeline(run_id).await?;
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    pub async fn statistics(&self, run_id: ResearchRunId) -> Result<AuditStatistics, CoreError> {
        let events = self.timeline(run_id).await?;
        let mut stats = AuditStatistics { total_events: events.len() as u64, ..Default::default() };
        for event in &events {
            *stats.by_event_type.entry(event_type_tag(event.event_type).to_string()).or_insert(0) += 1;
            *stats.by_level.entry(level_tag(event.level).to_string()).or_insert(0) += 1;
        }
        Ok(stats)
    }

    pub async fn report(&self, run_id: ResearchRunId) -> Result<AuditReport, CoreError> {
        let events = self.timeline(run_id).await?;
        let total = events.len() as u64;

        let errors = events.iter().filter(|e| e.level == EventLevel::Error || e.level == EventLevel::Critical).count() as u64;
        let warnings = events.iter().filter(|e| e.level == EventLevel::Warning).count() as u64;

        let duration = match (events.first(), events.last()) {
            (Some(first), Some(last)) => Some(last.timestamp - first.timestamp),
            _ => None,
        };

        let mut last_critical: Vec<AuditEvent> =
            events.iter().rev().filter(|e| e.level == EventLevel::Critical).take(LAST_CRITICAL_LIMIT).cloned().collect();
        last_critical.reverse();

        Ok(AuditReport {
            total_events: total,
            error_rate: rate(errors, total),
            warning_rate: rate(warnings, total),
            duration,
            last_critical_events: last_critical,
        })
    }
}

fn rate(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn event_type_tag(event_type: EventType) -> &'static str {
    match event_type {
        EventType::ResearchStart => "RESEARCH_START",
        EventType::ResearchComplete => "RESEARCH_COMPLETE",
        EventType::ContentDiscovery => "CONTENT_DISCOVERY",
        EventType::QualityAssessment => "QUALITY_ASSESSMENT",
        EventType::IntegrationProposal => "INTEGRATION_PROPOSAL",
        EventType::ReviewQueue => "REVIEW_QUEUE",
        EventType::ReviewDecision => "REVIEW_DECISION",
        EventType::SystemEvent => "SYSTEM_EVENT",
        EventType::Error => "ERROR",
        EventType::Recovery => "RECOVERY",
        EventType::Performance => "PERFORMANCE",
    }
}

fn level_tag(level: EventLevel) -> &'static str {
    match level {
        EventLevel::Info => "INFO",
        EventLevel::Warning => "WARNING",
        EventLevel::Error => "ERROR",
        EventLevel::Critical => "CRITICAL",
    }
}
