//! Pipeline orchestration: batch ingestion and query answering.
//!
//! [`InvoicePipeline`] composes the parser, chunk builder, embedding
//! provider, vector index, retriever and generator into two workflows:
//!
//! - **ingest**: parse → chunk → embed → index (a destructive full
//!   rebuild reflecting exactly the latest batch)
//! - **query**: retrieve → generate, packaged as a [`PipelineResult`]
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use invoice_rag::{InvoicePipeline, InMemoryVectorIndex, PipelineConfig};
//!
//! let pipeline = InvoicePipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!     .generative_model(Arc::new(model))
//!     .build()?;
//!
//! pipeline.ingest_texts(&documents).await?;
//! let result = pipeline.run("which trucks had battery problems?").await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::chunking::build_chunks;
use crate::config::PipelineConfig;
use crate::document::{Chunk, IngestReport, PipelineResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::TextExtractor;
use crate::generator::AnswerGenerator;
use crate::model::GenerativeModel;
use crate::parser::parse_invoice;
use crate::retriever::Retriever;
use crate::vectorstore::VectorIndex;

/// A named raw document ready for parsing.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Name used for attribution and logging (e.g. the source filename).
    pub name: String,
    /// Extracted plain text. May be empty, which parses to nothing.
    pub text: String,
}

impl SourceDocument {
    /// Create a source document from a name and its extracted text.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }
}

/// The end-to-end invoice QA pipeline.
///
/// Construct one via [`InvoicePipeline::builder()`]. Each
/// [`run`](InvoicePipeline::run) call is synchronous end-to-end: retrieval
/// completes (and its chunk sequence is fixed) before generation begins.
pub struct InvoicePipeline {
    config: PipelineConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    retriever: Retriever,
    generator: AnswerGenerator,
    extractor: Option<Arc<dyn TextExtractor>>,
}

impl InvoicePipeline {
    /// Create a new [`InvoicePipelineBuilder`].
    pub fn builder() -> InvoicePipelineBuilder {
        InvoicePipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Return a reference to the vector index.
    pub fn vector_index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Ingest a batch of raw documents: parse → chunk → embed → index.
    ///
    /// The index is rebuilt to reflect exactly this batch. Documents that
    /// fail to parse (no invoice id, empty text) are skipped and counted —
    /// a malformed document among a thousand never aborts the run.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if embedding or indexing fails.
    /// Per-document parse misses are not errors.
    pub async fn ingest_texts(&self, documents: &[SourceDocument]) -> Result<IngestReport> {
        let mut report = IngestReport { documents_total: documents.len(), ..Default::default() };
        let mut chunks: Vec<Chunk> = Vec::new();

        for document in documents {
            let Some(record) = parse_invoice(&document.text, &document.name) else {
                continue;
            };
            report.documents_parsed += 1;

            let document_chunks = build_chunks(&record);
            if document_chunks.is_empty() {
                debug!(
                    document = %document.name,
                    invoice_id = %record.invoice_id,
                    "invoice has no repair entries, nothing to index"
                );
            }
            chunks.extend(document_chunks);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed during ingestion");
            RagError::PipelineError(format!("embedding failed during ingestion: {e}"))
        })?;

        self.index.index(&chunks, &embeddings).await.map_err(|e| {
            error!(error = %e, "index rebuild failed during ingestion");
            RagError::PipelineError(format!("index rebuild failed: {e}"))
        })?;

        report.chunks_indexed = chunks.len();
        info!(
            documents_total = report.documents_total,
            documents_parsed = report.documents_parsed,
            chunks_indexed = report.chunks_indexed,
            "ingestion complete"
        );
        Ok(report)
    }

    /// Ingest documents from disk through the configured text extractor.
    ///
    /// Extraction failure degrades to empty text, which parses to nothing
    /// and is counted as a parse miss.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if no text extractor was
    /// configured, otherwise as [`ingest_texts`](InvoicePipeline::ingest_texts).
    pub async fn ingest_paths(&self, paths: &[PathBuf]) -> Result<IngestReport> {
        let extractor = self.extractor.as_ref().ok_or_else(|| {
            RagError::ConfigError("no text extractor configured for path ingestion".to_string())
        })?;

        let documents: Vec<SourceDocument> = paths
            .iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let text = extractor.extract(path).unwrap_or_default();
                SourceDocument { name, text }
            })
            .collect();

        self.ingest_texts(&documents).await
    }

    /// Answer a query using the configured `top_k`.
    pub async fn run(&self, query: &str) -> Result<PipelineResult> {
        self.run_with_top_k(query, self.config.top_k).await
    }

    /// Answer a query, retrieving `k` chunks instead of the configured
    /// `top_k`.
    ///
    /// Pure composition: retrieve, then generate, then package. Retrieving
    /// nothing useful is not a failure — the generator will answer with a
    /// grounding refusal, which is a valid result.
    pub async fn run_with_top_k(&self, query: &str, k: usize) -> Result<PipelineResult> {
        let retrieved = self.retriever.retrieve(query, k).await?;
        let generated = self.generator.generate(query, &retrieved).await?;

        info!(
            retrieved = retrieved.len(),
            sources = generated.source_invoice_ids.len(),
            "pipeline run complete"
        );

        Ok(PipelineResult {
            query: query.to_string(),
            answer: generated.answer,
            num_sources: retrieved.len(),
            retrieved_chunks: retrieved,
            source_invoices: generated.source_invoice_ids,
        })
    }
}

/// Builder for constructing an [`InvoicePipeline`].
///
/// The embedding provider, vector index and generative model are required;
/// the text extractor and config are optional. Call
/// [`build()`](InvoicePipelineBuilder::build) to validate and produce the
/// pipeline.
#[derive(Default)]
pub struct InvoicePipelineBuilder {
    config: Option<PipelineConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    model: Option<Arc<dyn GenerativeModel>>,
    extractor: Option<Arc<dyn TextExtractor>>,
}

impl InvoicePipelineBuilder {
    /// Set the pipeline configuration. Defaults to
    /// [`PipelineConfig::default()`].
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider used for both ingestion and queries.
    pub fn embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the generative model used for answering.
    pub fn generative_model(mut self, model: Arc<dyn GenerativeModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set an optional text extractor enabling
    /// [`ingest_paths`](InvoicePipeline::ingest_paths).
    pub fn text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Build the [`InvoicePipeline`], validating that all required
    /// components are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required component is
    /// missing.
    pub fn build(self) -> Result<InvoicePipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self.embedder.ok_or_else(|| {
            RagError::ConfigError("embedding_provider is required".to_string())
        })?;
        let index = self
            .index
            .ok_or_else(|| RagError::ConfigError("vector_index is required".to_string()))?;
        let model = self
            .model
            .ok_or_else(|| RagError::ConfigError("generative_model is required".to_string()))?;

        Ok(InvoicePipeline {
            retriever: Retriever::new(Arc::clone(&embedder), Arc::clone(&index)),
            generator: AnswerGenerator::new(model),
            config,
            embedder,
            index,
            extractor: self.extractor,
        })
    }
}
