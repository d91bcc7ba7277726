//! Keyed lookup-or-insert over per-service circuit breakers, behind a single
//! lock so concurrent callers never race to create two breakers for the same
//! service name.

use crate::circuit_breaker::CircuitBreaker;
use research_contracts::CoreConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct CircuitBreakerRegistry {
    config: CoreConfig,
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    pub fn new(config: CoreConfig) -> Self {
        Self { config, breakers: Mutex::new(HashMap::new()) }
    }

    /// Returns the breaker for `service`, creating it with the configured
    /// (or default) breaker settings on first use.
    pub async fn get(&self, service: &str) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().await;
        if let Some(breaker) = breakers.get(service) {
            return Arc::clone(breaker);
        }
        let breaker = Arc::new(CircuitBreaker::new(service, self.config.breaker_for(service)));
        breakers.insert(service.to_string(), Arc::clone(&breaker));
        breaker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reuses_the_same_breaker_for_a_service() {
        let registry = CircuitBreakerRegistry::new(CoreConfig::default());
        let a = registry.get("web-search").await;
        let b = registry.get("web-search").await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn different_services_get_independent_breakers() {
        let registry = CircuitBreakerRegistry::new(CoreConfig::default());
        let a = registry.get("web-search").await;
        let b = registry.get("academic").await;
        a.force_open().await;
        assert_eq!(a.state().await, crate::circuit_breaker::CircuitState::Open);
        assert_eq!(b.state().await, crate::circuit_breaker::CircuitState::Closed);
    }
}
