//! Data types for invoice records, chunks, and pipeline results.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Placeholder rendered for invoice fields that could not be parsed.
pub const UNKNOWN: &str = "UNKNOWN";

/// A parsed service invoice.
///
/// Produced once per document by [`parse_invoice`](crate::parser::parse_invoice)
/// and immutable thereafter. Records are consumed by the chunk builder and
/// then discarded — only their derived [`Chunk`]s are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceRecord {
    /// Name of the source document (e.g. the PDF filename).
    pub document_name: String,
    /// The invoice identifier. Always present on a parsed record — the
    /// parser refuses to produce a record without one.
    pub invoice_id: String,
    /// Invoice date, free-form as it appeared in the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Customer name, without any embedded email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Customer email, split out of the customer line when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    /// Vehicle details.
    pub vehicle: VehicleInfo,
    /// The serviced complaints, in document order. May be empty, in which
    /// case the record yields no chunks and is excluded from the index.
    pub repair_entries: Vec<RepairEntry>,
}

/// Vehicle details from an invoice header. Every field is best-effort.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VehicleInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<String>,
}

/// One serviced complaint within an invoice.
///
/// At least one of `complaint`, `cause`, `correction` is present: the parser
/// drops entries that carry only labor or parts with no narrative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RepairEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complaint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,
    /// Parts used, in document order.
    pub parts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_rate: Option<f64>,
}

impl RepairEntry {
    /// Whether the entry carries any narrative field.
    pub fn has_narrative(&self) -> bool {
        self.complaint.is_some() || self.cause.is_some() || self.correction.is_some()
    }
}

/// Invoice-level context attached to every chunk, stringified.
///
/// Fields that were absent on the source record hold the literal
/// [`UNKNOWN`] placeholder, so the key set is always complete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub invoice_id: String,
    pub date: String,
    pub customer_name: String,
    pub vehicle_year: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vin: String,
    pub mileage: String,
}

/// The atomic retrievable unit: one repair narrative with its full invoice
/// context repeated in the text body.
///
/// A chunk retrieved on its own is fully interpretable and attributable —
/// it does not depend on sibling chunks from the same invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Formatted merge of invoice-level context and one repair entry.
    pub text: String,
    /// Stringified invoice-level context.
    pub metadata: ChunkMetadata,
}

/// A [`Chunk`] persisted in a vector index together with its embedding and
/// a stable ordinal identifier.
///
/// Owned exclusively by the index, which assigns the `chunk_<ordinal>` id
/// at indexing time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedChunk {
    /// Stable identifier of the form `chunk_<ordinal>`.
    pub id: String,
    /// The chunk text and metadata.
    pub chunk: Chunk,
    /// The embedding vector for the chunk text.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] annotated with a normalized similarity and rank.
///
/// Constructed per query; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The chunk text.
    pub text: String,
    /// The chunk's invoice-level metadata.
    pub metadata: ChunkMetadata,
    /// Similarity in `[0, 1]`; 1.0 means identical under the index metric.
    pub similarity: f32,
    /// 1-based position in the result ordering.
    pub rank: usize,
}

/// The output of one end-to-end pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The original query.
    pub query: String,
    /// The generated answer, verbatim from the model.
    pub answer: String,
    /// The chunks supplied to the generator, in retrieval order.
    pub retrieved_chunks: Vec<RetrievedChunk>,
    /// Distinct invoice ids across the retrieved chunks.
    pub source_invoices: BTreeSet<String>,
    /// Number of retrieved chunks backing the answer.
    pub num_sources: usize,
}

/// Counters from a batch ingestion run.
///
/// `documents_total - documents_parsed` is the parse-miss count — a quality
/// metric, not an error condition.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents seen in the batch.
    pub documents_total: usize,
    /// Documents that yielded a usable invoice record.
    pub documents_parsed: usize,
    /// Chunks written to the index.
    pub chunks_indexed: usize,
}
