//! Pure derivation of phase durations, throughput, error rate, quality
//! statistics, and trend slopes from the audit log. Grounded on
//! `src/services/metrics/research_metrics.py`, with the Open Question from
//! `spec.md` §9 resolved: review/decision timing here is always read off
//! explicit `ReviewQueueEntry` timestamps by the caller, never derived from
//! this collector guessing at `updated_at`.
//!
//! The collector never mutates state — every method here takes `&self` over
//! read-only repository/audit-log handles.

pub mod quality;
pub mod trend;

pub use quality::QualityStatistics;
pub use trend::{least_squares_slope, TrendSlopes};

use chrono::{DateTime, Duration, Utc};
use research_audit::AuditLog;
use research_contracts::{
    CoreError, EventLevel, EventType, QualityAssessmentRepository, ResearchRunId, ResearchRunRepository, RunStatus,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Event types treated as phase markers; order matters for duration
/// derivation (duration of phase N = first occurrence of phase N+1 minus
/// first occurrence of phase N).
const PHASE_ORDER: &[EventType] = &[
    EventType::ResearchStart,
    EventType::ContentDiscovery,
    EventType::QualityAssessment,
    EventType::IntegrationProposal,
    EventType::ReviewQueue,
    EventType::ResearchComplete,
];

fn phase_name(event_type: EventType) -> &'static str {
    match event_type {
        EventType::ResearchStart => "RESEARCH_START",
        EventType::ContentDiscovery => "CONTENT_DISCOVERY",
        EventType::QualityAssessment => "QUALITY_ASSESSMENT",
        EventType::IntegrationProposal => "INTEGRATION_PROPOSAL",
        EventType::ReviewQueue => "REVIEW_QUEUE",
        EventType::ResearchComplete => "RESEARCH_COMPLETE",
        other => phase_name_fallback(other),
    }
}

fn phase_name_fallback(_event_type: EventType) -> &'static str {
    "OTHER"
}

#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    /// Duration between consecutive phase-marker first-occurrences, keyed
    /// by the later phase's name.
    pub phase_durations: HashMap<String, Duration>,
    pub throughput: HashMap<String, u64>,
    pub error_rate: f64,
    pub total_events: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateMetrics {
    pub total_runs: u64,
    pub success_rate: f64,
    pub quality: QualityStatistics,
    pub trend: TrendSlopes,
}

pub struct MetricsCollector {
    audit: Arc<AuditLog>,
    runs: Arc<dyn ResearchRunRepository>,
    assessments: Arc<dyn QualityAssessmentRepository>,
}

impl MetricsCollector {
    pub fn new(
        audit: Arc<AuditLog>,
        runs: Arc<dyn ResearchRunRepository>,
        assessments: Arc<dyn QualityAssessmentRepository>,
    ) -> Self {
        Self { audit, runs, assessments }
    }

    pub async fn run(&self, run_id: ResearchRunId) -> Result<RunMetrics, CoreError> {
        let timeline = self.audit.timeline(run_id).await?;
        if timeline.is_empty() {
            return Ok(RunMetrics::default());
        }

        let mut first_occurrence: HashMap<EventType, DateTime<Utc>> = HashMap::new();
        let mut throughput: HashMap<String, u64> = HashMap::new();
        let mut error_events: u64 = 0;

        for event in &timeline {
            first_occurrence.entry(event.event_type).or_insert(event.timestamp);
            if event.level == EventLevel::Error || event.level == EventLevel::Critical {
                error_events += 1;
            }
            for field in ["count", "completed", "failed"] {
                if let Some(value) = event.payload.get(field).and_then(|v| v.as_u64()) {
                    *throughput.entry(field.to_string()).or_insert(0) += value;
                }
            }
        }

        let mut phase_durations = HashMap::new();
        for window in PHASE_ORDER.windows(2) {
            let (from, to) = (window[0], window[1]);
            if let (Some(start), Some(end)) = (first_occurrence.get(&from), first_occurrence.get(&to)) {
                phase_durations.insert(phase_name(to).to_string(), *end - *start);
            }
        }

        Ok(RunMetrics {
            phase_durations,
            throughput,
            error_rate: error_events as f64 / timeline.len() as f64,
            total_events: timeline.len() as u64,
        })
    }

    /// Aggregates across every run, optionally restricted to runs created
    /// within `time_range`.
    pub async fn aggregate(&self, time_range: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Result<AggregateMetrics, CoreError> {
        let mut runs = self.runs.list(0, usize::MAX).await?;
        if let Some((start, end)) = time_range {
            runs.retain(|r| r.created_at >= start && r.created_at <= end);
        }

        let total_runs = runs.len() as u64;
        let completed = runs.iter().filter(|r| r.status == RunStatus::Completed).count() as u64;
        let success_rate = if total_runs == 0 { 0.0 } else { completed as f64 / total_runs as f64 };

        let mut all_overalls = Vec::new();
        for run in &runs {
            let assessments = self.assessments.list_for_run(run.id).await?;
            all_overalls.extend(assessments.iter().map(|a| a.overall));
        }
        let quality = QualityStatistics::from_scores(&all_overalls);

        let trend = trend::daily_trend(&runs);

        Ok(AggregateMetrics { total_runs, success_rate, quality, trend })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_contracts::{AssessmentMethod, AuditEvent, Bag, QualityAssessment, ResearchRun};
    use research_db::{InMemoryAuditEventRepository, InMemoryQualityAssessmentRepository, InMemoryResearchRunRepository};

    fn collector() -> (MetricsCollector, Arc<InMemoryResearchRunRepository>, Arc<InMemoryQualityAssessmentRepository>, Arc<AuditLog>) {
        let audit = Arc::new(AuditLog::new(Arc::new(InMemoryAuditEventRepository::new())));
        let runs = Arc::new(InMemoryResearchRunRepository::new());
        let assessments = Arc::new(InMemoryQualityAssessmentRepository::new());
        let collector = MetricsCollector::new(audit.clone(), runs.clone(), assessments.clone());
        (collector, runs, assessments, audit)
    }

    #[tokio::test]
    async fn phase_durations_measure_gaps_between_first_occurrences() {
        let (collector, _runs, _assessments, audit) = collector();
        let run_id = ResearchRunId::new();
        audit.append(AuditEvent::new(run_id, EventType::ResearchStart, EventLevel::Info, Bag::new())).await.unwrap();
        audit.append(AuditEvent::new(run_id, EventType::ContentDiscovery, EventLevel::Info, Bag::new())).await.unwrap();

        let metrics = collector.run(run_id).await.unwrap();
        assert!(metrics.phase_durations.contains_key("CONTENT_DISCOVERY"));
    }

    #[tokio::test]
    async fn error_rate_divides_by_total_events() {
        let (collector, _runs, _assessments, audit) = collector();
        let run_id = ResearchRunId::new();
        audit.append(AuditEvent::new(run_id, EventType::ResearchStart, EventLevel::Info, Bag::new())).await.unwrap();
        audit.append(AuditEvent::new(run_id, EventType::Error, EventLevel::Error, Bag::new())).await.unwrap();

        let metrics = collector.run(run_id).await.unwrap();
        assert_eq!(metrics.error_rate, 0.5);
    }

    #[tokio::test]
    async fn aggregate_success_rate_counts_only_completed_runs() {
        let (collector, runs, _assessments, _audit) = collector();
        let mut a = ResearchRun::new("a", "tester").unwrap();
        a.start().unwrap();
        a.complete().unwrap();
        let b = ResearchRun::new("b", "tester").unwrap();
        runs.insert(a).await.unwrap();
        runs.insert(b).await.unwrap();

        let aggregate = collector.aggregate(None).await.unwrap();
        assert_eq!(aggregate.total_runs, 2);
        assert_eq!(aggregate.success_rate, 0.5);
    }

    #[tokio::test]
    async fn quality_statistics_pull_from_every_run_assessment() {
        let (collector, runs, assessments, _audit) = collector();
        let run = ResearchRun::new("topic", "tester").unwrap();
        let run_id = run.id;
        runs.insert(run).await.unwrap();
        let assessment = QualityAssessment::new(
            research_contracts::ContentSourceId::new(),
            run_id,
            0.8,
            0.6,
            0.9,
            0.5,
            "s",
            "c",
            "r",
            AssessmentMethod::Fallback,
        )
        .unwrap();
        assessments.upsert(assessment.clone()).await.unwrap();

        let aggregate = collector.aggregate(None).await.unwrap();
        assert_eq!(aggregate.quality.avg, assessment.overall);
    }
}
