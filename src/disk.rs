//! Durable vector index persisted to a directory.
//!
//! [`DiskVectorIndex`] stores each rebuild as a self-contained generation
//! directory and tracks the live generation through a `CURRENT` pointer
//! file, swapped atomically via rename. A rebuild therefore never leaves a
//! window where readers observe a half-built index: until the pointer
//! moves, the previous generation stays live; after it moves, the previous
//! generation is deleted.
//!
//! Layout under the index root:
//!
//! ```text
//! <root>/CURRENT            name of the live generation directory
//! <root>/gen-000001/manifest.json
//! <root>/gen-000001/chunks.json
//! ```
//!
//! The directory is opaque to callers; only the [`VectorIndex`] contract is
//! stable. Concurrent rebuilds against the same root from multiple
//! processes are not supported — rebuild assumes exclusive write access.
//! Concurrent queries against a stable index are safe.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::document::{Chunk, IndexedChunk};
use crate::error::{RagError, Result};
use crate::vectorstore::{Neighbor, VectorIndex, chunk_id, nearest_neighbors};

const CURRENT_FILE: &str = "CURRENT";
const MANIFEST_FILE: &str = "manifest.json";
const CHUNKS_FILE: &str = "chunks.json";

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    generation: u64,
    dimensions: usize,
    chunk_count: usize,
}

#[derive(Debug, Default)]
struct State {
    generation: u64,
    chunks: Vec<IndexedChunk>,
}

/// A [`VectorIndex`] persisted as serde_json files under a root directory.
///
/// Search is an exact cosine scan over the in-memory copy of the live
/// generation, loaded at [`open`](DiskVectorIndex::open) and refreshed on
/// every [`index`](VectorIndex::index) call.
#[derive(Debug)]
pub struct DiskVectorIndex {
    root: PathBuf,
    state: RwLock<State>,
}

impl DiskVectorIndex {
    /// Open (or create) an index rooted at `root`.
    ///
    /// A root with no `CURRENT` pointer opens as an empty index — the
    /// normal cold-start condition before the first ingest. A root whose
    /// live generation cannot be read back is an error.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Self::io_err(&root, "create index root", e))?;

        let state = match Self::read_current(&root)? {
            Some(generation) => {
                let chunks = Self::load_generation(&root, generation)?;
                debug!(
                    root = %root.display(),
                    generation,
                    chunk_count = chunks.len(),
                    "opened disk index"
                );
                State { generation, chunks }
            }
            None => State::default(),
        };

        Ok(Self { root, state: RwLock::new(state) })
    }

    /// Path of the index root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn io_err(path: &Path, action: &str, e: std::io::Error) -> RagError {
        RagError::IndexError {
            backend: "Disk".to_string(),
            message: format!("failed to {action} at '{}': {e}", path.display()),
        }
    }

    fn generation_dir(root: &Path, generation: u64) -> PathBuf {
        root.join(format!("gen-{generation:06}"))
    }

    /// Read the `CURRENT` pointer, if the index has ever been built.
    fn read_current(root: &Path) -> Result<Option<u64>> {
        let current = root.join(CURRENT_FILE);
        if !current.exists() {
            return Ok(None);
        }
        let name = fs::read_to_string(&current)
            .map_err(|e| Self::io_err(&current, "read live-generation pointer", e))?;
        let generation = name
            .trim()
            .strip_prefix("gen-")
            .and_then(|n| n.parse::<u64>().ok())
            .ok_or_else(|| RagError::IndexError {
                backend: "Disk".to_string(),
                message: format!("malformed CURRENT pointer: '{}'", name.trim()),
            })?;
        Ok(Some(generation))
    }

    fn load_generation(root: &Path, generation: u64) -> Result<Vec<IndexedChunk>> {
        let path = Self::generation_dir(root, generation).join(CHUNKS_FILE);
        let bytes =
            fs::read(&path).map_err(|e| Self::io_err(&path, "read indexed chunks", e))?;
        serde_json::from_slice(&bytes).map_err(|e| RagError::IndexError {
            backend: "Disk".to_string(),
            message: format!("corrupt chunk file '{}': {e}", path.display()),
        })
    }

    /// Write a complete generation directory, then atomically repoint
    /// `CURRENT` at it.
    fn write_generation(root: &Path, generation: u64, chunks: &[IndexedChunk]) -> Result<()> {
        let dir = Self::generation_dir(root, generation);
        fs::create_dir_all(&dir).map_err(|e| Self::io_err(&dir, "create generation dir", e))?;

        let manifest = Manifest {
            generation,
            dimensions: chunks.first().map_or(0, |c| c.embedding.len()),
            chunk_count: chunks.len(),
        };
        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest_bytes = serde_json::to_vec_pretty(&manifest).map_err(|e| {
            RagError::IndexError {
                backend: "Disk".to_string(),
                message: format!("failed to serialize manifest: {e}"),
            }
        })?;
        fs::write(&manifest_path, manifest_bytes)
            .map_err(|e| Self::io_err(&manifest_path, "write manifest", e))?;

        let chunks_path = dir.join(CHUNKS_FILE);
        let chunk_bytes = serde_json::to_vec(chunks).map_err(|e| RagError::IndexError {
            backend: "Disk".to_string(),
            message: format!("failed to serialize chunks: {e}"),
        })?;
        fs::write(&chunks_path, chunk_bytes)
            .map_err(|e| Self::io_err(&chunks_path, "write chunks", e))?;

        // The rename is the commit point: readers either see the old
        // pointer or the new one, never a partial generation.
        let tmp = root.join(format!("{CURRENT_FILE}.tmp"));
        fs::write(&tmp, format!("gen-{generation:06}\n"))
            .map_err(|e| Self::io_err(&tmp, "write pointer", e))?;
        fs::rename(&tmp, root.join(CURRENT_FILE))
            .map_err(|e| Self::io_err(root, "swap live-generation pointer", e))?;

        Ok(())
    }
}

#[async_trait]
impl VectorIndex for DiskVectorIndex {
    async fn index(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != vectors.len() {
            return Err(RagError::IndexError {
                backend: "Disk".to_string(),
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

        // Hold the write lock across the whole rebuild so queries on this
        // handle never race the swap.
        let mut state = self.state.write().await;
        let old_generation = state.generation;
        let generation = old_generation + 1;

        Self::write_generation(&self.root, generation, &indexed)?;

        if old_generation > 0 {
            let old_dir = Self::generation_dir(&self.root, old_generation);
            if let Err(e) = fs::remove_dir_all(&old_dir) {
                warn!(dir = %old_dir.display(), error = %e, "failed to remove old generation");
            }
        }

        info!(
            root = %self.root.display(),
            generation,
            chunk_count = indexed.len(),
            "rebuilt disk index"
        );

        *state = State { generation, chunks: indexed };
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let state = self.state.read().await;
        Ok(nearest_neighbors(&state.chunks, vector, k))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.chunks.len())
    }
}
