//! Core library for certificate date and serial-number extraction.
//!
//! This crate provides:
//! - Rule-based date and serial resolvers over digital text and tables
//! - A completeness check deciding when the slow OCR pass is needed
//! - OCR bridges (external Tesseract, or pure-Rust PaddleOCR with `onnx`)
//! - A pure merge step producing one tagged result per document
//! - Record and search helpers for persisted results

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod records;

pub use error::{CertexError, Result};
pub use extract::{DocumentInput, HybridExtractor};
pub use models::config::CertexConfig;
pub use models::corpus::{CorpusPage, TableGrid, TextCorpus};
pub use models::result::{ExtractionMethod, ExtractionResult, SerialCandidate, SerialSource};
pub use ocr::{bridge_from_config, DocumentKind, DocumentSource, OcrBridge};
pub use pdf::{read_document, read_text_file, PdfReader};
pub use records::{RecordBook, SearchQuery, SheetRecord};
