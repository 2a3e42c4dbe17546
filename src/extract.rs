//! Document text extraction.
//!
//! The extractor is an external collaborator specified only by contract:
//! text in, or nothing. Any failure — corrupt file, missing file,
//! non-text content — surfaces as absent text, which the parser in turn
//! treats as "no record". An unreadable document is never fatal to a
//! batch ingestion run.

use std::path::Path;

#[cfg(feature = "pdf")]
use tracing::warn;

/// Extracts the plain text of a document on disk.
pub trait TextExtractor: Send + Sync {
    /// Extract page-concatenated plain text, or `None` on any failure.
    fn extract(&self, path: &Path) -> Option<String>;
}

/// A [`TextExtractor`] for PDF documents, backed by the `pdf-extract`
/// crate.
///
/// Only available when the `pdf` feature is enabled.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Option<String> {
        match pdf_extract::extract_text(path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "text extraction failed");
                None
            }
        }
    }
}
