//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-length dense vectors.
///
/// The same provider instance must serve both ingest-time chunk embedding
/// and query-time query embedding: the vector index cannot compare vectors
/// produced by different models or dimensionalities. Backends wrap an
/// expensive-to-construct model behind a unified async interface — construct
/// the provider once and share it via `Arc`.
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends with native batching should override it.
///
/// An empty string is valid input and yields a valid (if low-information)
/// vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    ///
    /// Invariant across arbitrary input text, and identical for
    /// [`embed`](EmbeddingProvider::embed) and
    /// [`embed_batch`](EmbeddingProvider::embed_batch).
    fn dimensions(&self) -> usize;
}
