//! Typed configuration: the closed enumerations the spec calls out
//! (per-dimension weights, freshness thresholds, breaker table) plus
//! stage concurrency caps and deadlines, loadable from the environment.
//! Grounded on `agent-agency-database`'s `DatabaseConfig::from_env` pattern.

use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_timeout: Duration,
    pub reset_timeout: Duration,
    pub half_open_max_requests: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            open_timeout: Duration::from_secs(30),
            reset_timeout: Duration::from_secs(60),
            half_open_max_requests: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Per-service breaker configuration; unknown services fall back to
    /// `default_breaker`.
    pub breakers: HashMap<String, BreakerConfig>,
    pub default_breaker: BreakerConfig,
    /// Topic substring -> freshness requirement in days.
    pub freshness_requirements: HashMap<String, u32>,
    pub default_freshness_requirement_days: u32,
    pub stage_concurrency_cap: usize,
    pub stage_deadline: Duration,
    pub ai_enabled: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let mut freshness_requirements = HashMap::new();
        freshness_requirements.insert("news".to_string(), 7);
        freshness_requirements.insert("tech".to_string(), 180);
        freshness_requirements.insert("technology".to_string(), 180);
        freshness_requirements.insert("science".to_string(), 365);

        Self {
            breakers: HashMap::new(),
            default_breaker: BreakerConfig::default(),
            freshness_requirements,
            default_freshness_requirement_days: 90,
            stage_concurrency_cap: 8,
            stage_deadline: Duration::from_secs(30),
            ai_enabled: false,
        }
    }
}

impl CoreConfig {
    pub fn breaker_for(&self, service: &str) -> BreakerConfig {
        self.breakers.get(service).cloned().unwrap_or_else(|| self.default_breaker.clone())
    }

    pub fn freshness_requirement_days(&self, topic: &str) -> u32 {
        let topic_lower = topic.to_lowercase();
        for (needle, days) in &self.freshness_requirements {
            if topic_lower.contains(needle.as_str()) {
                return *days;
            }
        }
        self.default_freshness_requirement_days
    }

    /// Load overrides from the environment, matching `AI_ENABLED` and the
    /// per-stage tuning knobs named in spec.md §6.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("AI_ENABLED") {
            config.ai_enabled = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("STAGE_CONCURRENCY_CAP") {
            if let Ok(n) = v.parse() {
                config.stage_concurrency_cap = n;
            }
        }
        if let Ok(v) = std::env::var("STAGE_DEADLINE_SECONDS") {
            if let Ok(n) = v.parse() {
                config.stage_deadline = Duration::from_secs(n);
            }
        }
        config
    }
}
