//! Digital PDF reading.

mod reader;

pub use reader::PdfReader;

use std::path::Path;

use tracing::debug;

use crate::error::PdfError;
use crate::models::corpus::TextCorpus;
use crate::ocr::{DocumentKind, DocumentSource};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Digital corpus of a document.
///
/// PDFs are read page by page; images become one implicit page with no text.
pub fn read_document(source: &DocumentSource) -> crate::Result<TextCorpus> {
    match source.kind {
        DocumentKind::Image => Ok(TextCorpus::single_image()),
        DocumentKind::Pdf => {
            let data = std::fs::read(&source.path)?;
            let corpus = PdfReader::load(&data)?.corpus();
            debug!(
                "Read {} pages, {} chars from {}",
                corpus.page_count(),
                corpus.text_len(),
                source.path.display()
            );
            Ok(corpus)
        }
    }
}

/// Corpus from already-extracted text; form feeds separate pages.
pub fn read_text_file(path: &Path) -> crate::Result<TextCorpus> {
    let text = std::fs::read_to_string(path)?;
    Ok(TextCorpus::from_texts(text.split('\u{c}')))
}
