//! Chunk construction: one retrieval unit per repair entry.
//!
//! The chunking granularity is the central design decision of the system.
//! One chunk per *document* would conflate unrelated repairs under a single
//! vector; one chunk per *sentence* would lose the invoice and vehicle
//! context needed to attribute an answer. One chunk per *repair narrative*,
//! with the invoice header repeated verbatim in every chunk, keeps each
//! retrieved unit both precise and self-contained.

use crate::document::{Chunk, ChunkMetadata, InvoiceRecord, RepairEntry, UNKNOWN};

/// Build the chunk set for a parsed invoice.
///
/// Pure and infallible: a record with no repair entries yields an empty
/// vec, and the output length always equals `record.repair_entries.len()`.
pub fn build_chunks(record: &InvoiceRecord) -> Vec<Chunk> {
    let metadata = chunk_metadata(record);
    record
        .repair_entries
        .iter()
        .map(|entry| Chunk {
            text: format_chunk_text(record, entry),
            metadata: metadata.clone(),
        })
        .collect()
}

/// Stringify the invoice-level context, substituting the `UNKNOWN`
/// placeholder for absent fields so the key set is always complete.
fn chunk_metadata(record: &InvoiceRecord) -> ChunkMetadata {
    ChunkMetadata {
        invoice_id: record.invoice_id.clone(),
        date: or_unknown(&record.date),
        customer_name: or_unknown(&record.customer_name),
        vehicle_year: or_unknown(&record.vehicle.year),
        vehicle_make: or_unknown(&record.vehicle.make),
        vehicle_model: or_unknown(&record.vehicle.model),
        vin: or_unknown(&record.vehicle.vin),
        mileage: or_unknown(&record.vehicle.mileage),
    }
}

/// Render one repair entry with its full invoice context.
///
/// The template shape is fixed: every labeled line is always present, with
/// placeholder text where a value is missing. Uniform shape keeps the
/// embedding space consistent across chunks with sparse fields.
fn format_chunk_text(record: &InvoiceRecord, entry: &RepairEntry) -> String {
    let parts = if entry.parts.is_empty() {
        "None listed".to_string()
    } else {
        entry.parts.join(", ")
    };
    let labor = match entry.labor_hours {
        Some(hours) => format!("{hours} hours"),
        None => "Not specified".to_string(),
    };

    format!(
        "Invoice: {invoice_id}\n\
         Date: {date}\n\
         Customer: {customer}\n\
         Vehicle: {year} {make} {model}\n\
         VIN: {vin}\n\
         Mileage: {mileage}\n\
         \n\
         Complaint: {complaint}\n\
         Cause: {cause}\n\
         Correction: {correction}\n\
         Parts Used: {parts}\n\
         Labor: {labor}",
        invoice_id = record.invoice_id,
        date = or_unknown(&record.date),
        customer = or_unknown(&record.customer_name),
        year = or_unknown(&record.vehicle.year),
        make = or_unknown(&record.vehicle.make),
        model = or_unknown(&record.vehicle.model),
        vin = or_unknown(&record.vehicle.vin),
        mileage = or_unknown(&record.vehicle.mileage),
        complaint = entry.complaint.as_deref().unwrap_or(UNKNOWN),
        cause = entry.cause.as_deref().unwrap_or(UNKNOWN),
        correction = entry.correction.as_deref().unwrap_or(UNKNOWN),
    )
}

fn or_unknown(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| UNKNOWN.to_string())
}
