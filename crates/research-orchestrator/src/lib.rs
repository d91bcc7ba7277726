//! Stage-graph workflow runner: `DISCOVER -> ASSESS -> PROPOSE ->
//! ENQUEUE_REVIEW`, with per-stage recovery and run-scoped concurrency
//! control. Grounded on `src/services/research_orchestrator.py`'s
//! `ResearchOrchestrator.execute_research` method.

pub mod orchestrator;
pub mod recovery;

pub use orchestrator::Orchestrator;
