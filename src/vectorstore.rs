//! Vector index trait for storing chunk embeddings and answering
//! nearest-neighbor queries.

use async_trait::async_trait;

use crate::document::{Chunk, IndexedChunk};
use crate::error::Result;

/// A chunk returned from an index query, paired with its cosine distance
/// to the query vector (lower is more similar).
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// The matched chunk with its stored embedding and id.
    pub chunk: IndexedChunk,
    /// Cosine distance in `[0, 2]` for non-degenerate vectors.
    pub distance: f32,
}

/// A storage backend for chunk embeddings with similarity search.
///
/// The index is the sole owner and writer of its [`IndexedChunk`]s: it
/// assigns each chunk a stable `chunk_<ordinal>` identifier at indexing
/// time, and indexing is a destructive full rebuild — there is no partial
/// update path. Re-ingesting replaces the previous contents entirely.
///
/// # Example
///
/// ```rust,ignore
/// use invoice_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.index(&chunks, &embeddings).await?;
/// let neighbors = index.query(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replace the index contents with the given chunks and their vectors.
    ///
    /// `chunks` and `vectors` are parallel sequences and must have equal
    /// length. Each chunk is assigned the id `chunk_<ordinal>` from its
    /// position in the input.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexError`](crate::RagError::IndexError) when
    /// the lengths differ or the backend fails to persist.
    async fn index(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()>;

    /// Return the `k` nearest chunks to the given vector, ordered by
    /// ascending cosine distance (most similar first; ties keep insertion
    /// order).
    ///
    /// Returns fewer than `k` results only when the index holds fewer than
    /// `k` chunks. Querying an index that has never been built returns an
    /// empty vec — a normal cold-start condition, not an error.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Number of chunks currently held by the index.
    async fn count(&self) -> Result<usize>;
}

/// Compute cosine distance (`1 − cosine similarity`) between two vectors.
///
/// Returns 1.0 (orthogonal) if either vector has zero magnitude.
pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// Format the stable identifier for the chunk at `ordinal`.
pub(crate) fn chunk_id(ordinal: usize) -> String {
    format!("chunk_{ordinal}")
}

/// Brute-force scan: score every stored chunk against the query vector and
/// keep the `k` nearest by ascending distance.
///
/// Exact rather than approximate — at this system's corpus scale (low
/// thousands of vectors) a linear cosine scan is well within query-latency
/// budget, and exactness makes the reflexive self-match property hold
/// without qualification.
pub(crate) fn nearest_neighbors(stored: &[IndexedChunk], vector: &[f32], k: usize) -> Vec<Neighbor> {
    let mut scored: Vec<Neighbor> = stored
        .iter()
        .map(|chunk| Neighbor {
            chunk: chunk.clone(),
            distance: cosine_distance(&chunk.embedding, vector),
        })
        .collect();

    // Stable sort keeps insertion order among equal distances.
    scored.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}
