//! Merge of the digital, table and OCR stage outputs into one result.
//!
//! [`merge`] is a pure function: the same stage outputs always give the same
//! [`ExtractionResult`].

use crate::models::result::{
    DateCandidate, ExtractionMethod, ExtractionResult, SerialCandidate, SerialSource,
};

use super::rules::dedup_candidates;

/// What one pass over a corpus or table grid produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOutput {
    pub date: Option<DateCandidate>,
    pub serials: Vec<SerialCandidate>,
}

impl PassOutput {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.serials.is_empty()
    }
}

/// Tagged result of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    /// The stage ran and produced data.
    Found(T),
    /// The stage ran and produced nothing.
    Empty,
    /// The stage could not run (no input, engine missing).
    Unavailable,
}

impl StageOutcome<PassOutput> {
    pub fn from_pass(pass: PassOutput) -> Self {
        if pass.is_empty() {
            Self::Empty
        } else {
            Self::Found(pass)
        }
    }
}

impl<T> StageOutcome<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Empty | Self::Unavailable => None,
        }
    }
}

/// Stage outputs of one document.
#[derive(Debug, Clone)]
pub struct MergeInput {
    pub digital: StageOutcome<PassOutput>,
    pub table: StageOutcome<PassOutput>,
    /// `None` when the OCR stage was not triggered.
    pub ocr: Option<StageOutcome<PassOutput>>,
    /// The digital corpus was classified as scanned.
    pub scanned: bool,
}

/// Where the final date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateOrigin {
    Digital,
    Table,
    Ocr,
}

/// Combine stage outputs and assign the method tag.
pub fn merge(input: &MergeInput) -> ExtractionResult {
    let digital = input.digital.found();
    let table = input.table.found();
    let ocr = input.ocr.as_ref().and_then(StageOutcome::found);

    let ocr_date = ocr.and_then(|p| p.date.as_ref()).map(|d| (d, DateOrigin::Ocr));
    let regex_date = digital
        .and_then(|p| p.date.as_ref())
        .map(|d| (d, DateOrigin::Digital))
        .or_else(|| {
            table
                .and_then(|p| p.date.as_ref())
                .map(|d| (d, DateOrigin::Table))
        });

    // On scanned documents OCR overrides whatever the digital text claimed.
    let date = if input.scanned {
        ocr_date.or(regex_date)
    } else {
        regex_date.or(ocr_date)
    };

    let ocr_serials = ocr.map(|p| p.serials.as_slice()).unwrap_or_default();
    let drop_digital_serials = input.scanned && !ocr_serials.is_empty();

    let mut candidates: Vec<SerialCandidate> = Vec::new();
    if let Some(table) = table {
        candidates.extend(table.serials.iter().cloned());
    }
    if let Some(digital) = digital.filter(|_| !drop_digital_serials) {
        candidates.extend(digital.serials.iter().cloned());
    }
    candidates.extend(ocr_serials.iter().cloned());
    candidates.sort_by_key(|c| (c.source, c.position));
    let serials = dedup_candidates(candidates);

    let method = match &input.ocr {
        None => ExtractionMethod::Regex,
        Some(_) => {
            let ocr_contributed = matches!(date, Some((_, DateOrigin::Ocr)))
                || serials.iter().any(|c| c.source == SerialSource::Ocr);
            let regex_contributed = matches!(date, Some((_, DateOrigin::Digital | DateOrigin::Table)))
                || serials.iter().any(|c| c.source != SerialSource::Ocr);

            match (regex_contributed, ocr_contributed) {
                (false, false) => ExtractionMethod::OcrFailed,
                (true, false) => ExtractionMethod::Regex,
                (true, true) => ExtractionMethod::RegexOcr,
                (false, true) => ExtractionMethod::Ocr,
            }
        }
    };

    ExtractionResult {
        date: date.map(|(d, _)| d.normalized()),
        serial_numbers: serials.iter().map(SerialCandidate::render).collect(),
        method,
    }
}
