//! Error types for the certex-core library.

use thiserror::Error;

/// Main error type for the certex library.
#[derive(Error, Debug)]
pub enum CertexError {
    /// PDF reading error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR bridge error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Extraction invocation error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the digital text reader.
///
/// The engine never sees these: a caller that hits one hands the engine an
/// empty corpus and lets the OCR path decide the outcome.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The declared MIME type is not a supported document kind.
    #[error("unsupported document type: {0}")]
    UnsupportedType(String),
}

/// Errors related to OCR bridges.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The external engine (or rasterizer) is not installed or cannot start.
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    /// Rendering document pages to images failed.
    #[error("rasterization failed: {0}")]
    Rasterize(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),
}

/// Errors returned by the extraction engine itself.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Neither a digital corpus nor a runnable OCR path was supplied.
    #[error("malformed invocation: {0}")]
    MalformedInvocation(String),
}

/// Result type for the certex library.
pub type Result<T> = std::result::Result<T, CertexError>;
