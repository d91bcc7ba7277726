//! Deterministic default `Embedder`/`VectorStore` used when no real
//! embedding model or vector index is configured (both are out of scope as
//! features — `spec.md` §1 — but the analyzer still needs something to run
//! against end to end). The embedding is a fixed-width hash projection, not
//! a semantic one; it makes `propose()` deterministic and exercisable
//! without claiming to approximate real similarity.

use async_trait::async_trait;
use dashmap::DashMap;
use research_contracts::{CoreError, Embedder, SimilarityMatch, VectorStore};
use sha2::{Digest, Sha256};

const EMBEDDING_DIMS: usize = 32;

/// Hashes `text` into `EMBEDDING_DIMS` buckets, normalizing the result to a
/// unit vector so cosine similarity stays in `[-1, 1]`.
pub struct DeterministicEmbedder;

#[async_trait]
impl Embedder for DeterministicEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CoreError> {
        let mut buckets = vec![0f32; EMBEDDING_DIMS];
        for token in text.split_whitespace() {
            let digest = Sha256::digest(token.as_bytes());
            let bucket = digest[0] as usize % EMBEDDING_DIMS;
            let sign = if digest[1] % 2 == 0 { 1.0 } else { -1.0 };
            buckets[bucket] += sign;
        }
        let norm = buckets.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut buckets {
                *value /= norm;
            }
        }
        Ok(buckets)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)) as f64
    }
}

/// A linear-scan, in-process vector index. Fine for the scale this core
/// operates at; a real deployment would swap this for an actual vector
/// database without changing the `VectorStore` contract.
#[derive(Default)]
pub struct InMemoryVectorStore {
    vectors: DashMap<String, Vec<f32>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self { vectors: DashMap::new() }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn find_similar(&self, vector: &[f32], k: usize, min_similarity: f64) -> Result<Vec<SimilarityMatch>, CoreError> {
        let mut matches: Vec<SimilarityMatch> = self
            .vectors
            .iter()
            .map(|entry| SimilarityMatch {
                id: entry.key().clone(),
                similarity: cosine_similarity(vector, entry.value()),
                title: None,
                tags: Vec::new(),
            })
            .filter(|m| m.similarity >= min_similarity)
            .collect();

        matches.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(k);
        Ok(matches)
    }

    async fn upsert(&self, id: &str, vector: &[f32]) -> Result<(), CoreError> {
        self.vectors.insert(id.to_string(), vector.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedding_the_same_text_is_deterministic() {
        let embedder = DeterministicEmbedder;
        let a = embedder.embed("transformer architectures").await.unwrap();
        let b = embedder.embed("transformer architectures").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn find_similar_respects_the_minimum_similarity_floor() {
        let store = InMemoryVectorStore::new();
        store.upsert("a", &[1.0, 0.0]).await.unwrap();
        store.upsert("b", &[0.0, 1.0]).await.unwrap();

        let matches = store.find_similar(&[1.0, 0.0], 10, 0.9).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "a");
    }

    #[tokio::test]
    async fn find_similar_truncates_to_k_ordered_by_similarity() {
        let store = InMemoryVectorStore::new();
        store.upsert("a", &[1.0, 0.0]).await.unwrap();
        store.upsert("b", &[0.9, 0.1]).await.unwrap();
        store.upsert("c", &[0.0, 1.0]).await.unwrap();

        let matches = store.find_similar(&[1.0, 0.0], 1, -1.0).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "a");
    }
}
