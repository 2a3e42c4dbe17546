//! Query-time retrieval: embed, search, normalize, rank.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::RetrievedChunk;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// Convert a cosine distance into a similarity in `[0, 1]`.
///
/// Valid input is the cosine-distance range `[0, 2]`; the mapping is
/// `1 − distance` clamped into `[0, 1]`, so distance `0` is similarity
/// `1.0` and every distance of `1` or more floors at `0.0`. Out-of-range
/// inputs (a malformed backend return is not guaranteed to respect the
/// bound) clamp silently rather than failing the query — a defensive
/// correction, not a proof of well-formedness.
pub fn similarity_from_distance(distance: f32) -> f32 {
    (1.0 - distance).clamp(0.0, 1.0)
}

/// Retrieves ranked chunks for a natural-language query.
///
/// Composes the embedding provider and vector index: the query is embedded
/// with the same provider used at ingest time, the index returns neighbors
/// by ascending distance, and each is annotated with a normalized
/// similarity and 1-based rank. No re-ranking, no filtering, and no
/// deduplication by invoice — one invoice legitimately contributes several
/// chunks to a result set.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    /// Create a retriever over the given provider and index.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve the top `k` chunks for a query.
    ///
    /// An uninitialized or empty index yields an empty vec — a valid
    /// terminal state for the caller, not an error.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if query embedding or the index lookup
    /// fails.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            RagError::PipelineError(format!("query embedding failed: {e}"))
        })?;

        let neighbors = self.index.query(&query_embedding, k).await.map_err(|e| {
            error!(error = %e, "vector index query failed");
            RagError::PipelineError(format!("index query failed: {e}"))
        })?;

        let retrieved: Vec<RetrievedChunk> = neighbors
            .into_iter()
            .enumerate()
            .map(|(i, neighbor)| RetrievedChunk {
                text: neighbor.chunk.chunk.text,
                metadata: neighbor.chunk.chunk.metadata,
                similarity: similarity_from_distance(neighbor.distance),
                rank: i + 1,
            })
            .collect();

        debug!(query_len = query.len(), k, result_count = retrieved.len(), "retrieval complete");
        Ok(retrieved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_maps_distance_boundaries() {
        assert_eq!(similarity_from_distance(0.0), 1.0);
        assert_eq!(similarity_from_distance(0.25), 0.75);
        assert_eq!(similarity_from_distance(1.0), 0.0);
        // The far half of the cosine range floors at zero.
        assert_eq!(similarity_from_distance(1.5), 0.0);
        assert_eq!(similarity_from_distance(2.0), 0.0);
    }

    #[test]
    fn similarity_clamps_out_of_range_distances() {
        // Backends occasionally return tiny negative distances for
        // identical vectors; far out-of-range values floor at zero.
        assert_eq!(similarity_from_distance(-1.0e-6), 1.0);
        assert_eq!(similarity_from_distance(3.7), 0.0);
    }
}
