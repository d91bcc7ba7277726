//! Circuit breaker pattern: CLOSED / OPEN / HALF_OPEN admission control for
//! one external dependency.
//!
//! OPEN -> HALF_OPEN happens lazily on the next admission check, never via a
//! background timer.

use research_contracts::BreakerConfig;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub total_requests: u64,
}

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    last_failure_at: Option<Instant>,
    opened_at: Option<Instant>,
    /// Requests admitted in the current half-open episode.
    half_open_admitted: u32,
    total_requests: u64,
}

pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                last_failure_at: None,
                opened_at: None,
                half_open_admitted: 0,
                total_requests: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a new call should be attempted. Performs the lazy
    /// OPEN -> HALF_OPEN transition if `open_timeout` has elapsed.
    pub async fn can_admit(&self) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or(Duration::ZERO);
                if elapsed >= self.config.open_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.consecutive_successes = 0;
                    inner.half_open_admitted = 1;
                    inner.total_requests += 1;
                    info!(breaker = %self.name, "circuit breaker transitioning OPEN -> HALF_OPEN");
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_admitted < self.config.half_open_max_requests {
                    inner.half_open_admitted += 1;
                    inner.total_requests += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => {
                let reset_due = inner
                    .last_failure_at
                    .map(|t| t.elapsed() >= self.config.reset_timeout)
                    .unwrap_or(false);
                if reset_due {
                    inner.consecutive_failures = 0;
                    inner.last_failure_at = None;
                }
            }
            CircuitState::HalfOpen => {
                inner.consecutive_successes += 1;
                if inner.consecutive_successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.consecutive_successes = 0;
                    inner.half_open_admitted = 0;
                    info!(breaker = %self.name, "circuit breaker closed after recovery");
                }
            }
            CircuitState::Open => {}
        }
    }

    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.last_failure_at = Some(Instant::now());
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    warn!(breaker = %self.name, failures = inner.consecutive_failures, "circuit breaker opened");
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.consecutive_successes = 0;
                inner.half_open_admitted = 0;
                warn!(breaker = %self.name, "circuit breaker reopened after half-open failure");
            }
            CircuitState::Open => {}
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    pub async fn stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.lock().await;
        CircuitBreakerStats {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            consecutive_successes: inner.consecutive_successes,
            total_requests: inner.total_requests,
        }
    }

    pub async fn force_open(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
    }

    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.consecutive_successes = 0;
        inner.last_failure_at = None;
        inner.opened_at = None;
        inner.half_open_admitted = 0;
    }
}
