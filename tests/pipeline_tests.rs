//! End-to-end pipeline tests over mock backends.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use invoice_rag::mock::{MockEmbedder, MockGenerativeModel};
use invoice_rag::model::GenerativeModel;
use invoice_rag::{
    InMemoryVectorIndex, InvoicePipeline, PipelineConfig, RagError, SourceDocument, TextExtractor,
};

const BATTERY_INVOICE: &str = "Invoice: 12345\n\
Date: 3/1/2024\n\
Customer: Acme Corp\n\
Vehicle: 2020 Ford F-150\n\
VIN: 1FT1234567890\n\
Complaint: Won't start\n\
Cause: Dead battery\n\
Correction: Replaced battery\n\
Labor: 0.5 hrs @ $100\n\
Parts: Battery";

const TRANSMISSION_INVOICE: &str = "Invoice: 67890\n\
Date: 4/2/2024\n\
Customer: Widget Co\n\
Vehicle: 2019 Peterbilt 579\n\
VIN: 2PB9876543210\n\
Mileage: 210,000\n\
Complaint: Transmission slipping\n\
Cause: Low fluid\n\
Correction: Refilled transmission fluid\n\
Labor: 1.5 hrs @ $120\n\
Parts: Transmission fluid";

fn pipeline_with(model_reply: &str) -> (InvoicePipeline, Arc<MockGenerativeModel>) {
    let model = Arc::new(MockGenerativeModel::new(model_reply));
    let dyn_model: Arc<dyn GenerativeModel> = model.clone();
    let pipeline = InvoicePipeline::builder()
        .config(PipelineConfig::builder().top_k(5).build().unwrap())
        .embedding_provider(Arc::new(MockEmbedder::new(128)))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .generative_model(dyn_model)
        .build()
        .unwrap();
    (pipeline, model)
}

#[tokio::test]
async fn ingest_then_query_answers_with_sources() {
    let (pipeline, _model) = pipeline_with("Invoice 12345 had a dead battery replaced.");

    let report = pipeline
        .ingest_texts(&[
            SourceDocument::new("inv_12345.pdf", BATTERY_INVOICE),
            SourceDocument::new("inv_67890.pdf", TRANSMISSION_INVOICE),
        ])
        .await
        .unwrap();
    assert_eq!(report.documents_total, 2);
    assert_eq!(report.documents_parsed, 2);
    assert_eq!(report.chunks_indexed, 2);

    let result = pipeline.run("battery failure").await.unwrap();
    assert_eq!(result.query, "battery failure");
    assert_eq!(result.answer, "Invoice 12345 had a dead battery replaced.");
    assert_eq!(result.num_sources, 2);
    assert_eq!(result.retrieved_chunks.len(), 2);

    // The battery chunk must outrank the unrelated transmission chunk.
    assert_eq!(result.retrieved_chunks[0].metadata.invoice_id, "12345");
    assert_eq!(result.retrieved_chunks[0].rank, 1);
    assert!(
        result.retrieved_chunks[0].similarity >= result.retrieved_chunks[1].similarity
    );

    let sources: Vec<&str> = result.source_invoices.iter().map(String::as_str).collect();
    assert_eq!(sources, vec!["12345", "67890"]);
}

#[tokio::test]
async fn malformed_documents_are_skipped_not_fatal() {
    let (pipeline, _model) = pipeline_with("ok");

    let report = pipeline
        .ingest_texts(&[
            SourceDocument::new("good_1.pdf", BATTERY_INVOICE),
            SourceDocument::new("scan_junk.pdf", "illegible smudges"),
            SourceDocument::new("good_2.pdf", TRANSMISSION_INVOICE),
            SourceDocument::new("empty.pdf", ""),
        ])
        .await
        .unwrap();

    assert_eq!(report.documents_total, 4);
    assert_eq!(report.documents_parsed, 2);
    assert_eq!(report.chunks_indexed, 2);
}

#[tokio::test]
async fn invoice_without_repair_entries_is_excluded_from_the_index() {
    let (pipeline, _model) = pipeline_with("ok");

    let report = pipeline
        .ingest_texts(&[
            SourceDocument::new("no_work.pdf", "Invoice: 42\nDate: 5/5/2024"),
            SourceDocument::new("inv.pdf", BATTERY_INVOICE),
        ])
        .await
        .unwrap();

    assert_eq!(report.documents_parsed, 2);
    assert_eq!(report.chunks_indexed, 1);
    assert_eq!(pipeline.vector_index().count().await.unwrap(), 1);
}

#[tokio::test]
async fn reingestion_rebuilds_rather_than_appends() {
    let (pipeline, _model) = pipeline_with("ok");

    pipeline
        .ingest_texts(&[
            SourceDocument::new("a.pdf", BATTERY_INVOICE),
            SourceDocument::new("b.pdf", TRANSMISSION_INVOICE),
        ])
        .await
        .unwrap();
    pipeline.ingest_texts(&[SourceDocument::new("b.pdf", TRANSMISSION_INVOICE)]).await.unwrap();

    assert_eq!(pipeline.vector_index().count().await.unwrap(), 1);
    let result = pipeline.run("battery failure").await.unwrap();
    assert_eq!(result.retrieved_chunks.len(), 1);
    assert_eq!(result.retrieved_chunks[0].metadata.invoice_id, "67890");
}

#[tokio::test]
async fn querying_before_any_ingest_is_a_grounding_refusal_not_an_error() {
    let refusal = "I cannot find this information in the provided invoices.";
    let (pipeline, _model) = pipeline_with(refusal);

    let result = pipeline.run("anything?").await.unwrap();
    assert_eq!(result.answer, refusal);
    assert!(result.retrieved_chunks.is_empty());
    assert!(result.source_invoices.is_empty());
    assert_eq!(result.num_sources, 0);
}

#[tokio::test]
async fn run_with_top_k_overrides_the_configured_breadth() {
    let (pipeline, _model) = pipeline_with("ok");
    pipeline
        .ingest_texts(&[
            SourceDocument::new("a.pdf", BATTERY_INVOICE),
            SourceDocument::new("b.pdf", TRANSMISSION_INVOICE),
        ])
        .await
        .unwrap();

    let result = pipeline.run_with_top_k("battery failure", 1).await.unwrap();
    assert_eq!(result.retrieved_chunks.len(), 1);
    assert_eq!(result.num_sources, 1);
}

#[test]
fn builder_requires_all_core_components() {
    let err = match InvoicePipeline::builder()
        .embedding_provider(Arc::new(MockEmbedder::new(8)))
        .build()
    {
        Ok(_) => panic!("expected builder to reject missing core components"),
        Err(e) => e,
    };
    assert!(matches!(err, RagError::ConfigError(_)));
}

/// Reads `.txt` files; anything else fails extraction.
struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }
}

#[tokio::test]
async fn path_ingestion_degrades_extraction_failures_to_parse_misses() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("inv_12345.txt");
    std::fs::write(&good, BATTERY_INVOICE).unwrap();
    let missing = dir.path().join("not_there.txt");

    let model = Arc::new(MockGenerativeModel::new("ok"));
    let pipeline = InvoicePipeline::builder()
        .embedding_provider(Arc::new(MockEmbedder::new(64)))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .generative_model(model)
        .text_extractor(Arc::new(PlainTextExtractor))
        .build()
        .unwrap();

    let report = pipeline.ingest_paths(&[good, missing]).await.unwrap();
    assert_eq!(report.documents_total, 2);
    assert_eq!(report.documents_parsed, 1);
    assert_eq!(report.chunks_indexed, 1);
}

#[tokio::test]
async fn path_ingestion_without_an_extractor_is_a_config_error() {
    let (pipeline, _model) = pipeline_with("ok");
    let err = pipeline.ingest_paths(&[PathBuf::from("inv.pdf")]).await.unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)));
}
