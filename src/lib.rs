//! # invoice-rag
//!
//! Retrieval-augmented question answering over truck service invoices.
//!
//! ## Overview
//!
//! The crate turns raw invoice text into retrievable units and answers
//! natural-language questions over them with traceable sources:
//!
//! - [`parser`] — labeled-field parsing of invoice text into
//!   [`InvoiceRecord`]s with nested repair entries
//! - [`chunking`] — one self-contained [`Chunk`] per repair narrative
//! - [`embedding`] — the [`EmbeddingProvider`] seam mapping text to
//!   fixed-length vectors
//! - [`vectorstore`] — the [`VectorIndex`] seam, with an in-memory
//!   ([`InMemoryVectorIndex`]) and a directory-persisted
//!   ([`DiskVectorIndex`]) backend
//! - [`retriever`] — query embedding, nearest-neighbor lookup, similarity
//!   normalization and ranking
//! - [`generator`] — grounding-prompt assembly and answer generation with
//!   deterministic source attribution
//! - [`pipeline`] — [`InvoicePipeline`], composing ingest
//!   (parse → chunk → embed → index) and query (retrieve → generate)
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use invoice_rag::{InvoicePipeline, InMemoryVectorIndex, SourceDocument};
//! use invoice_rag::anthropic::AnthropicModel;
//! use invoice_rag::fastembed::LocalEmbeddingProvider;
//!
//! let pipeline = InvoicePipeline::builder()
//!     .embedding_provider(Arc::new(LocalEmbeddingProvider::new()?))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!     .generative_model(Arc::new(AnthropicModel::from_env()?))
//!     .build()?;
//!
//! pipeline.ingest_texts(&[SourceDocument::new("inv_12345.txt", raw_text)]).await?;
//! let result = pipeline.run("which trucks had battery problems?").await?;
//! println!("{} (sources: {:?})", result.answer, result.source_invoices);
//! ```
//!
//! ## Features
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `local-embeddings` | `fastembed::LocalEmbeddingProvider` (all-MiniLM-L6-v2, 384 dims) |
//! | `anthropic` | `anthropic::AnthropicModel` (Messages API) |
//! | `pdf` | `extract::PdfTextExtractor` |
//!
//! With no features enabled the crate still provides the full pipeline
//! against the trait seams, plus deterministic [`mock`] backends for
//! offline use and tests.

#[cfg(feature = "anthropic")]
pub mod anthropic;
pub mod chunking;
pub mod config;
pub mod disk;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
#[cfg(feature = "local-embeddings")]
pub mod fastembed;
pub mod generator;
pub mod inmemory;
pub mod mock;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod retriever;
pub mod vectorstore;

pub use chunking::build_chunks;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use disk::DiskVectorIndex;
pub use document::{
    Chunk, ChunkMetadata, IndexedChunk, IngestReport, InvoiceRecord, PipelineResult, RepairEntry,
    RetrievedChunk, VehicleInfo,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::TextExtractor;
pub use generator::{AnswerGenerator, GeneratedAnswer};
pub use inmemory::InMemoryVectorIndex;
pub use model::GenerativeModel;
pub use parser::parse_invoice;
pub use pipeline::{InvoicePipeline, InvoicePipelineBuilder, SourceDocument};
pub use retriever::{Retriever, similarity_from_distance};
pub use vectorstore::{Neighbor, VectorIndex};

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicModel;
#[cfg(feature = "pdf")]
pub use extract::PdfTextExtractor;
#[cfg(feature = "local-embeddings")]
pub use self::fastembed::LocalEmbeddingProvider;
