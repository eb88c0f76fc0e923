//! Persisted extraction records and search over them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::extract::rules::patterns::RANGE_VALUE;
use crate::extract::rules::DateResolver;
use crate::models::result::ExtractionResult;

/// One stored row: a document plus what was extracted from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRecord {
    #[serde(rename = "File Name")]
    pub file_name: String,

    /// `DD/MM/YYYY` or empty.
    #[serde(rename = "Date", default)]
    pub date: String,

    /// Serial numbers, one per line.
    #[serde(rename = "Serial Number", default)]
    pub serial_number: String,

    #[serde(rename = "Method", default)]
    pub method: String,

    /// Stable document identifier; the dedup key.
    #[serde(rename = "Link", default)]
    pub link: String,
}

impl SheetRecord {
    pub fn new(
        file_name: impl Into<String>,
        link: impl Into<String>,
        result: &ExtractionResult,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            date: result.date.clone().unwrap_or_default(),
            serial_number: result.serial_numbers_joined(),
            method: result.method.to_string(),
            link: link.into(),
        }
    }
}

/// Records keyed by link. Content is never used for dedup.
#[derive(Debug, Clone, Default)]
pub struct RecordBook {
    records: Vec<SheetRecord>,
    links: HashSet<String>,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = SheetRecord>) -> Self {
        let mut book = Self::new();
        for record in records {
            book.push(record);
        }
        book
    }

    /// Append a record. Returns false if its link is already stored.
    pub fn push(&mut self, record: SheetRecord) -> bool {
        if !self.links.insert(record.link.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn contains_link(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    pub fn records(&self) -> &[SheetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching a query, in storage order.
    pub fn search(&self, query: &SearchQuery) -> Vec<&SheetRecord> {
        self.records.iter().filter(|r| query.matches(r)).collect()
    }
}

/// Serial and/or date search. Both criteria must hold when both are set.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    serial: Option<String>,
    date: Option<String>,
    normalized_date: Option<String>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        let serial = serial.into().trim().to_string();
        self.serial = (!serial.is_empty()).then_some(serial);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        let date = date.into().trim().to_string();
        if date.is_empty() {
            self.date = None;
            self.normalized_date = None;
        } else {
            self.normalized_date = DateResolver::new().normalize(&date);
            self.date = Some(date);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.serial.is_none() && self.date.is_none()
    }

    pub fn matches(&self, record: &SheetRecord) -> bool {
        let serial_ok = self
            .serial
            .as_deref()
            .is_none_or(|q| serial_matches(q, &record.serial_number));
        let date_ok = self.date.as_deref().is_none_or(|q| {
            record.date.contains(q)
                || self
                    .normalized_date
                    .as_deref()
                    .is_some_and(|n| record.date.contains(n))
        });
        serial_ok && date_ok
    }
}

/// Case-insensitive substring match, or membership in a stored
/// `FROM-TO` range of the same shape.
fn serial_matches(query: &str, stored: &str) -> bool {
    let query = query.to_uppercase();
    let stored = stored.to_uppercase();
    if stored.contains(&query) {
        return true;
    }
    stored.lines().any(|line| in_range(&query, line.trim()))
}

fn in_range(query: &str, line: &str) -> bool {
    // Strip a trailing context annotation such as " (TUBE)".
    let value = line.split(" (").next().unwrap_or(line);
    let Some(caps) = RANGE_VALUE.captures(value) else {
        return false;
    };
    let (from, to) = (&caps[1], &caps[2]);
    let shape = |s: &str| s.chars().map(|c| c.is_ascii_digit()).collect::<Vec<_>>();
    shape(query) == shape(from) && shape(from) == shape(to) && from <= query && query <= to
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::ExtractionMethod;
    use pretty_assertions::assert_eq;

    fn record(name: &str, date: &str, serial: &str, link: &str) -> SheetRecord {
        SheetRecord {
            file_name: name.to_string(),
            date: date.to_string(),
            serial_number: serial.to_string(),
            method: "Regex".to_string(),
            link: link.to_string(),
        }
    }

    fn book() -> RecordBook {
        RecordBook::from_records([
            record("CO_123.pdf", "12/05/2023", "SN-001\nSN-002", "link1"),
            record("CQ_456.pdf", "01/01/2024", "SN-999", "link2"),
            record("CO_789.pdf", "12/05/2023", "SN-003", "link3"),
        ])
    }

    fn names(found: Vec<&SheetRecord>) -> Vec<&str> {
        found.iter().map(|r| r.file_name.as_str()).collect()
    }

    #[test]
    fn test_record_from_result() {
        let result = ExtractionResult {
            date: Some("01/01/2024".to_string()),
            serial_numbers: vec!["A123".to_string(), "8194 (Tube)".to_string()],
            method: ExtractionMethod::RegexOcr,
        };
        let record = SheetRecord::new("cert.pdf", "https://drive/1", &result);
        assert_eq!(record.serial_number, "A123\n8194 (Tube)");
        assert_eq!(record.method, "Regex + OCR");
        assert_eq!(record.date, "01/01/2024");
    }

    #[test]
    fn test_dedup_by_link() {
        let mut book = book();
        assert!(!book.push(record("renamed.pdf", "", "", "link1")));
        assert!(book.push(record("CO_123.pdf", "12/05/2023", "SN-001", "link4")));
        assert_eq!(book.len(), 4);
        assert!(book.contains_link("link4"));
    }

    #[test]
    fn test_serial_search() {
        let book = book();
        let found = book.search(&SearchQuery::new().with_serial("sn-002"));
        assert_eq!(names(found), vec!["CO_123.pdf"]);
    }

    #[test]
    fn test_date_search() {
        let book = book();
        let found = book.search(&SearchQuery::new().with_date("12/05/2023"));
        assert_eq!(names(found), vec!["CO_123.pdf", "CO_789.pdf"]);
    }

    #[test]
    fn test_combined_search() {
        let book = book();
        let query = SearchQuery::new().with_serial("SN-001").with_date("12/05/2023");
        assert_eq!(names(book.search(&query)), vec!["CO_123.pdf"]);
    }

    #[test]
    fn test_normalized_date_search() {
        let book = RecordBook::from_records([record("CO_001.pdf", "01/01/2026", "SN-001", "l")]);
        for query in ["1/1/2026", "2026-01-01", "January 1, 2026"] {
            let found = book.search(&SearchQuery::new().with_date(query));
            assert_eq!(found.len(), 1, "query {:?}", query);
        }
    }

    #[test]
    fn test_range_membership() {
        let book = RecordBook::from_records([
            record("a.pdf", "", "A001-A010 (Tube)", "1"),
            record("b.pdf", "", "B001-B010", "2"),
        ]);
        assert_eq!(names(book.search(&SearchQuery::new().with_serial("a005"))), vec!["a.pdf"]);
        assert!(book.search(&SearchQuery::new().with_serial("A011")).is_empty());
        assert!(book.search(&SearchQuery::new().with_serial("A5")).is_empty());
    }

    #[test]
    fn test_empty_query_matches_all() {
        let query = SearchQuery::new().with_serial("  ").with_date("");
        assert!(query.is_empty());
        assert_eq!(book().search(&query).len(), 3);
    }
}
