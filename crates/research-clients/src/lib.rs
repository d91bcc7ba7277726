//! `ExternalClient` implementations, content-hash dedup, and the discovery
//! fan-out service that ties them to the circuit breaker registry.

pub mod clients;
pub mod discovery;
pub mod error;
pub mod mock;

pub use clients::{AcademicClient, NewsClient, WebSearchClient};
pub use discovery::{ContentDiscoveryService, Deduper, DiscoveryOutcome};
pub use error::ClientCallOutcome;
pub use mock::MockExternalClient;
