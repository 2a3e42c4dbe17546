//! In-memory vector index using brute-force cosine search.
//!
//! [`InMemoryVectorIndex`] holds the indexed chunks in a
//! `tokio::sync::RwLock`-protected vec. Suitable for tests, development,
//! and serving a corpus that fits comfortably in memory; for a durable
//! index use [`DiskVectorIndex`](crate::disk::DiskVectorIndex).

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, IndexedChunk};
use crate::error::{RagError, Result};
use crate::vectorstore::{Neighbor, VectorIndex, chunk_id, nearest_neighbors};

/// An in-memory [`VectorIndex`] with exact cosine search.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    chunks: RwLock<Vec<IndexedChunk>>,
}

impl InMemoryVectorIndex {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn index(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != vectors.len() {
            return Err(RagError::IndexError {
                backend: "InMemory".to_string(),
                message: format!(
                    "chunk/vector length mismatch: {} chunks, {} vectors",
                    chunks.len(),
                    vectors.len()
                ),
            });
        }

        let indexed: Vec<IndexedChunk> = chunks
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(ordinal, (chunk, embedding))| IndexedChunk {
                id: chunk_id(ordinal),
                chunk: chunk.clone(),
                embedding: embedding.clone(),
            })
            .collect();

        let mut stored = self.chunks.write().await;
        *stored = indexed;
        debug!(chunk_count = stored.len(), "rebuilt in-memory index");
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let stored = self.chunks.read().await;
        Ok(nearest_neighbors(&stored, vector, k))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.chunks.read().await.len())
    }
}
