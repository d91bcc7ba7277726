//! Pluggable collaborator capabilities the core consumes: external discovery
//! clients, the embedder, the vector store, the optional AI adapter.
//! Grounded on `council/src/contracts.rs`'s `#[async_trait]` trait style.

use crate::content_source::SourceType;
use crate::error::CoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A single item returned by an `ExternalClient`, before it is turned into a
/// persisted `ContentSource`.
#[derive(Debug, Clone)]
pub struct RawItem {
    pub source_type: SourceType,
    pub canonical_identifier: String,
    pub url: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub metadata: crate::common::Bag,
}

#[async_trait]
pub trait ExternalClient: Send + Sync {
    /// Stable service identifier matched against breaker configuration.
    fn name(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        limit: usize,
        deadline: Duration,
    ) -> Result<Vec<RawItem>, CoreError>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CoreError>;
}

#[derive(Debug, Clone)]
pub struct SimilarityMatch {
    pub id: String,
    pub similarity: f64,
    pub title: Option<String>,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn find_similar(
        &self,
        vector: &[f32],
        k: usize,
        min_similarity: f64,
    ) -> Result<Vec<SimilarityMatch>, CoreError>;

    async fn upsert(&self, id: &str, vector: &[f32]) -> Result<(), CoreError>;
}

#[derive(Debug, Clone)]
pub struct ScoreSet {
    pub credibility: f64,
    pub relevance: f64,
    pub freshness: f64,
    pub completeness: f64,
    pub overall: f64,
}

/// Optional AI augmentation. Any method may fail with
/// `CoreError::Unavailable`, in which case the caller falls back to the
/// deterministic path.
#[async_trait]
pub trait AIAdapter: Send + Sync {
    async fn summarize(&self, content: &str) -> Result<String, CoreError>;
    async fn classify(&self, title: &str, source_type: SourceType) -> Result<String, CoreError>;
    async fn rationalize(&self, scores: &ScoreSet, content: &str) -> Result<String, CoreError>;
}
