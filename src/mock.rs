//! Deterministic mock backends for offline development and testing.

use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::model::GenerativeModel;

/// A deterministic [`EmbeddingProvider`] built on hashed token
/// projections.
///
/// Each lowercased alphanumeric token is hashed to seed a pseudo-random
/// unit direction; a text embeds as the normalized sum of its token
/// directions. Texts sharing vocabulary land measurably closer in cosine
/// space than unrelated texts, while distinct tokens stay near-orthogonal.
/// Crude, but enough for exercising retrieval ordering without a real
/// model, and fully reproducible.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    /// Create a mock embedder producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in
            text.to_lowercase().split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            // Non-zero seed keeps the xorshift sequence live.
            let mut state = hasher.finish() | 1;
            for value in &mut vector {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                *value += (state >> 40) as f32 / (1u64 << 23) as f32 - 1.0;
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// A scripted [`GenerativeModel`] that returns a fixed reply and records
/// every prompt it was given.
#[derive(Debug, Default)]
pub struct MockGenerativeModel {
    reply: String,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockGenerativeModel {
    /// Create a mock model that always replies with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), calls: Mutex::new(Vec::new()) }
    }

    /// The `(system, user)` prompt pairs received so far, in call order.
    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl GenerativeModel for MockGenerativeModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.calls.lock().await.push((system.to_string(), user.to_string()));
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_deterministic_and_fixed_length() {
        let embedder = MockEmbedder::new(32);
        let a = embedder.embed("dead battery").await.unwrap();
        let b = embedder.embed("dead battery").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert_eq!(embedder.embed("").await.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn single_and_batch_embeddings_share_dimensions() {
        let embedder = MockEmbedder::new(48);
        for text in ["battery", "a much longer repair narrative about brakes", ""] {
            let single = embedder.embed(text).await.unwrap();
            let batch = embedder.embed_batch(&[text]).await.unwrap();
            assert_eq!(single.len(), embedder.dimensions());
            assert_eq!(batch[0].len(), single.len());
            assert_eq!(batch[0], single);
        }
    }

    #[tokio::test]
    async fn shared_vocabulary_scores_closer() {
        let embedder = MockEmbedder::new(64);
        let battery = embedder.embed("battery replacement service").await.unwrap();
        let query = embedder.embed("battery failure").await.unwrap();
        let unrelated = embedder.embed("transmission slipping badly").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&query, &battery) > dot(&query, &unrelated));
    }
}
