//! Static pattern tables for date and serial-number extraction.
//!
//! Everything here is immutable configuration compiled once on first use.

use lazy_static::lazy_static;
use regex::Regex;

/// Labels that introduce a serial number.
pub const SERIAL_KEYWORDS: &[&str] = &[
    "Ref No",
    "Ref No.",
    "Certificate No.",
    "Serial Number",
    "Serial No.",
    "S/N",
    "SN",
    "Ser.No.",
    "Ser.Nos.",
    "Ser. Nos.",
];

/// Values containing one of these are addresses, not serials.
pub const ADDRESS_TERMS: &[&str] = &["Lane", "Street", "Ward", "District", "Hanoi", "Vietnam"];

/// Values equal to one of these are quantity labels.
pub const QUANTITY_LABELS: &[&str] = &["pcs", "pes", "EA", "Quantity"];

/// Component nouns used to annotate serials.
pub const CONTEXT_NOUNS: &[&str] = &["Tube", "Anode", "Inverter", "Generator", "Tank", "Detector"];

/// Labels of a date cell in a table.
pub const TABLE_DATE_LABELS: &[&str] = &["Issue Date", "Dated", "Date"];

/// Minimum serial value length in characters.
pub const MIN_SERIAL_LEN: usize = 4;

/// Lines below a bare keyword searched for standalone values.
pub const VERTICAL_SCAN_LINES: usize = 5;

/// Characters before a keyword searched for a component noun.
pub const CONTEXT_WINDOW: usize = 30;

lazy_static! {
    // Serial keyword with optional trailing dot. Longest alternatives first.
    pub static ref SERIAL_KEYWORD: Regex = Regex::new(&keyword_pattern(SERIAL_KEYWORDS)).unwrap();

    pub static ref TABLE_DATE_LABEL: Regex = Regex::new(&keyword_pattern(TABLE_DATE_LABELS)).unwrap();

    // Punctuation between a keyword and its value.
    pub static ref KEYWORD_SEPARATOR: Regex = Regex::new(r"^[\s:.#\-]*").unwrap();

    // Same-line segment splitter: comma, semicolon or a run of 2+ spaces.
    pub static ref SEGMENT_SPLIT: Regex = Regex::new(r"[,;]|\s{2,}|\t").unwrap();

    // Leading serial-shaped token run of a segment.
    pub static ref SERIAL_VALUE: Regex = Regex::new(
        r"^[A-Za-z0-9]+(?:\s*[-~/._]\s*[A-Za-z0-9]+)*"
    ).unwrap();

    // A whole line that is one serial-shaped token.
    pub static ref STANDALONE_TOKEN: Regex = Regex::new(
        r"^[A-Za-z0-9]+(?:[-~/._][A-Za-z0-9]+)*$"
    ).unwrap();

    // Two hyphen-joined tokens.
    pub static ref RANGE_VALUE: Regex = Regex::new(
        r"^([A-Za-z0-9]+)\s*-\s*([A-Za-z0-9]+)$"
    ).unwrap();

    // Component noun, whole word.
    pub static ref CONTEXT_NOUN: Regex = Regex::new(
        &format!(r"(?i)\b(?:{})\b", CONTEXT_NOUNS.join("|"))
    ).unwrap();

    // Simple fractions like 1/3.
    pub static ref FRACTION: Regex = Regex::new(r"^\d{1,2}/\d{1,2}$").unwrap();

    // Dates, in priority order.
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[\-.](\d{1,2})[\-.](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_NAME: Regex = Regex::new(&format!(
        r"(?i)\b{}\.?\s+(\d{{1,2}})(?:,\s*|\s+)(\d{{4}})\b",
        MONTH_NAMES
    )).unwrap();

    pub static ref DATE_DMY_DOTTED: Regex = Regex::new(
        r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b"
    ).unwrap();

    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})\s+{}\.?,?\s+(\d{{4}})\b",
        MONTH_NAMES
    )).unwrap();

    // "Date: ..." with a loosely formatted value.
    pub static ref DATE_LABELED: Regex = Regex::new(
        r"(?i)\b(?:Issue\s+Date|Dated|Date)[:.\s]*([A-Za-z0-9/.\-, ]{8,20})"
    ).unwrap();
}

// Full names before abbreviations so alternation prefers the longer match.
const MONTH_NAMES: &str = "(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)";

/// Month number from a full or abbreviated English month name.
pub fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Build a case-insensitive alternation over keywords.
///
/// Trailing dots become optional and inner spaces match any whitespace run.
fn keyword_pattern(keywords: &[&str]) -> String {
    let mut stems: Vec<String> = keywords
        .iter()
        .map(|k| regex::escape(k.trim_end_matches('.')).replace(' ', r"\s*"))
        .collect();
    stems.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    stems.dedup();
    format!(r"(?i)\b(?:{})\b\.?", stems.join("|"))
}

/// True if the text contains a serial keyword.
pub fn has_serial_keyword(text: &str) -> bool {
    SERIAL_KEYWORD.is_match(text)
}
