//! Circuit breakers for the external dependencies the core calls out to
//! (search clients, the AI adapter): per-service state plus a registry so
//! every caller for a given service shares one breaker.

pub mod circuit_breaker;
pub mod registry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerStats, CircuitState};
pub use registry::CircuitBreakerRegistry;
