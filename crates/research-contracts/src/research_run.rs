//! `ResearchRun`: the top-level workflow entity the orchestrator drives.

use crate::common::{validate_non_empty, now, Bag, Provenance};
use crate::error::CoreError;
use crate::ids::ResearchRunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunCounters {
    pub sources_discovered: u64,
    pub sources_assessed: u64,
    pub sources_approved: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRun {
    pub id: ResearchRunId,
    pub topic: String,
    pub parameters: Bag,
    pub provenance: Provenance,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub counters: RunCounters,
    pub error_details: Option<String>,
}

impl ResearchRun {
    pub fn new(topic: impl Into<String>, created_by: impl Into<String>) -> Result<Self, CoreError> {
        let topic = topic.into();
        validate_non_empty("topic", &topic)?;
        let ts = now();
        Ok(Self {
            id: ResearchRunId::new(),
            topic,
            parameters: Bag::new(),
            provenance: Provenance::new(created_by),
            status: RunStatus::Pending,
            created_at: ts,
            updated_at: ts,
            started_at: None,
            completed_at: None,
            counters: RunCounters::default(),
            error_details: None,
        })
    }

    /// PENDING -> RUNNING. Idempotence/conflict guarding against concurrent
    /// starts is the orchestrator's job (run-scoped lock); this method only
    /// enforces the state-machine shape.
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.status != RunStatus::Pending {
            return Err(CoreError::conflict(format!(
                "run {} is not PENDING (status={:?})",
                self.id, self.status
            )));
        }
        self.status = RunStatus::Running;
        self.started_at = Some(now());
        self.updated_at = now();
        Ok(())
    }

    fn finish(&mut self, status: RunStatus) -> Result<(), CoreError> {
        if self.status != RunStatus::Running {
            return Err(CoreError::conflict(format!(
                "run {} is not RUNNING (status={:?})",
                self.id, self.status
            )));
        }
        self.status = status;
        self.completed_at = Some(now());
        self.updated_at = now();
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), CoreError> {
        self.finish(RunStatus::Completed)
    }

    pub fn fail(&mut self, error_details: impl Into<String>) -> Result<(), CoreError> {
        self.error_details = Some(error_details.into());
        self.finish(RunStatus::Failed)
    }

    pub fn cancel(&mut self) -> Result<(), CoreError> {
        self.finish(RunStatus::Cancelled)
    }

    pub fn record_discovered(&mut self, count: u64) {
        self.counters.sources_discovered += count;
        self.updated_at = now();
    }

    pub fn record_assessed(&mut self, count: u64) {
        self.counters.sources_assessed += count;
        self.updated_at = now();
    }

    pub fn record_approved(&mut self, count: u64) {
        self.counters.sources_approved += count;
        self.updated_at = now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_topic() {
        assert!(ResearchRun::new("", "tester").is_err());
    }

    #[test]
    fn lifecycle_sets_timestamps_exactly_once() {
        let mut run = ResearchRun::new("transformer architectures", "tester").unwrap();
        assert!(run.started_at.is_none());
        run.start().unwrap();
        assert!(run.started_at.is_some());
        assert!(run.completed_at.is_none());
        run.complete().unwrap();
        assert!(run.completed_at.is_some());
        assert!(run.started_at.unwrap() <= run.completed_at.unwrap());
    }

    #[test]
    fn never_re_enters_running() {
        let mut run = ResearchRun::new("topic", "tester").unwrap();
        run.start().unwrap();
        run.complete().unwrap();
        assert!(run.start().is_err());
    }

    #[test]
    fn counters_are_monotonic() {
        let mut run = ResearchRun::new("topic", "tester").unwrap();
        run.record_discovered(3);
        run.record_discovered(2);
        assert_eq!(run.counters.sources_discovered, 5);
    }
}
