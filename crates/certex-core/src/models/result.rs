//! Candidates and the final extraction record.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a serial-number candidate came from.
///
/// Declaration order is merge priority: earlier variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialSource {
    /// Keyword/value adjacency in a table grid.
    Table,
    /// Value on the same line as a keyword.
    SameLine,
    /// Standalone token on one of the lines below a keyword.
    VerticalScan,
    /// Hyphen-joined `FROM-TO` range.
    Range,
    /// Anything recovered from the OCR corpus.
    Ocr,
}

/// A provisional serial number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialCandidate {
    /// The serial value as written (ranges joined as `FROM-TO`).
    pub value: String,
    /// Component noun found near the keyword, e.g. `Tube`.
    pub context: Option<String>,
    pub source: SerialSource,
    /// Discovery position: byte offset in the corpus text, or cell order
    /// for table candidates.
    pub position: usize,
}

impl SerialCandidate {
    pub fn new(value: impl Into<String>, source: SerialSource, position: usize) -> Self {
        Self {
            value: value.into(),
            context: None,
            source,
            position,
        }
    }

    pub fn with_context(mut self, context: Option<&str>) -> Self {
        self.context = context.map(str::to_string);
        self
    }

    /// Case-normalized dedup key.
    pub fn key(&self) -> String {
        self.value.to_uppercase()
    }

    /// `VALUE` or `VALUE (Noun)`.
    pub fn render(&self) -> String {
        match &self.context {
            Some(noun) => format!("{} ({})", self.value, noun),
            None => self.value.clone(),
        }
    }
}

/// A matched and calendar-validated date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCandidate {
    /// Text as matched in the corpus.
    pub raw: String,
    /// Byte span of the match in the corpus text.
    pub span: (usize, usize),
    pub date: NaiveDate,
}

impl DateCandidate {
    /// Canonical `DD/MM/YYYY` form.
    pub fn normalized(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

/// Which extraction path(s) produced the final data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractionMethod {
    #[serde(rename = "Regex")]
    Regex,
    #[serde(rename = "Regex + OCR")]
    RegexOcr,
    #[serde(rename = "OCR (Tesseract)")]
    Ocr,
    #[serde(rename = "OCR (Tesseract) (Failed)")]
    OcrFailed,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "Regex",
            Self::RegexOcr => "Regex + OCR",
            Self::Ocr => "OCR (Tesseract)",
            Self::OcrFailed => "OCR (Tesseract) (Failed)",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one artifact the engine exposes per document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// `DD/MM/YYYY`, or absent.
    pub date: Option<String>,
    /// Distinct (case-insensitively) rendered serial numbers in priority order.
    pub serial_numbers: Vec<String>,
    pub method: ExtractionMethod,
}

impl ExtractionResult {
    /// True when neither a date nor a serial number was found.
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.serial_numbers.is_empty()
    }

    /// Serial numbers joined one per line, as stored by the persistence layer.
    pub fn serial_numbers_joined(&self) -> String {
        self.serial_numbers.join("\n")
    }
}
