//! Local embedding provider backed by the `fastembed` crate.
//!
//! This module is only available when the `local-embeddings` feature is
//! enabled.

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::Mutex;
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Embedding dimensions of `all-MiniLM-L6-v2`.
const MINILM_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] running `all-MiniLM-L6-v2` locally via ONNX.
///
/// The model is expensive to construct (weights are loaded — and on first
/// use, downloaded — in [`new`](LocalEmbeddingProvider::new)) and stateless
/// afterwards. Construct the provider once at process start and share it
/// via `Arc`; both ingest-time chunk embedding and query-time query
/// embedding must go through the same instance so vectors stay comparable.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use invoice_rag::fastembed::LocalEmbeddingProvider;
///
/// let provider = Arc::new(LocalEmbeddingProvider::new()?);
/// let embedding = provider.embed("battery replacement").await?;
/// assert_eq!(embedding.len(), 384);
/// ```
pub struct LocalEmbeddingProvider {
    model: Mutex<TextEmbedding>,
}

impl LocalEmbeddingProvider {
    /// Load the `all-MiniLM-L6-v2` model.
    pub fn new() -> Result<Self> {
        let options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        let model = TextEmbedding::try_new(options).map_err(|e| RagError::EmbeddingError {
            provider: "fastembed".into(),
            message: format!("failed to load embedding model: {e}"),
        })?;
        Ok(Self { model: Mutex::new(model) })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::EmbeddingError {
            provider: "fastembed".into(),
            message: "model returned no embedding".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(provider = "fastembed", batch_size = texts.len(), "embedding batch");

        let mut model = self.model.lock().await;
        let embeddings =
            model.embed(texts.to_vec(), None).map_err(|e| RagError::EmbeddingError {
                provider: "fastembed".into(),
                message: format!("embedding failed: {e}"),
            })?;
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        MINILM_DIMENSIONS
    }
}
