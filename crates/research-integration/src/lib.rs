//! Similarity-driven connection and tag proposal generation for
//! knowledge-graph integration.

pub mod analyzer;
pub mod connections;
pub mod fallback;
pub mod tags;

pub use analyzer::IntegrationAnalyzer;
pub use connections::suggest_connections;
pub use fallback::{DeterministicEmbedder, InMemoryVectorStore};
pub use tags::suggest_tags;
