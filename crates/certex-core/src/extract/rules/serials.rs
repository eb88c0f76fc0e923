//! Serial-number resolution from free text.
//!
//! Each keyword occurrence is resolved in one of two modes:
//!
//! - **same line**: the rest of the line after the keyword is split on
//!   commas, semicolons and wide gaps; every segment that validates is a
//!   candidate;
//! - **vertical scan**: when the same line holds nothing usable, the next
//!   few lines are searched for standalone serial tokens (columnar layouts
//!   where the label sits above the values).
//!
//! In either mode a `FROM-TO` pair of same-shaped tokens is kept whole as a
//! range. A component noun shortly before the keyword annotates every value
//! that keyword produced.

use std::collections::HashMap;

use tracing::trace;

use super::patterns::{
    has_serial_keyword, ADDRESS_TERMS, CONTEXT_NOUN, CONTEXT_NOUNS, CONTEXT_WINDOW, FRACTION,
    KEYWORD_SEPARATOR, MIN_SERIAL_LEN, QUANTITY_LABELS, RANGE_VALUE, SEGMENT_SPLIT,
    SERIAL_KEYWORD, SERIAL_VALUE, STANDALONE_TOKEN, VERTICAL_SCAN_LINES,
};
use super::FieldExtractor;
use crate::models::corpus::TextCorpus;
use crate::models::result::{SerialCandidate, SerialSource};

/// A value located in text, before annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocatedValue {
    pub value: String,
    pub source: SerialSource,
    pub offset: usize,
}

/// Serial-number resolver.
pub struct SerialResolver;

impl SerialResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve all serial candidates of a corpus, ordered by position and
    /// deduplicated case-insensitively.
    pub fn resolve(&self, corpus: &TextCorpus) -> Vec<SerialCandidate> {
        self.extract_all(&corpus.text())
    }

    fn scan(&self, text: &str) -> Vec<SerialCandidate> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut line_offsets = Vec::with_capacity(lines.len());
        let mut offset = 0;
        for line in &lines {
            line_offsets.push(offset);
            offset += line.len() + 1;
        }

        let mut found = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let occurrences = keyword_occurrences(line);

            for (k, &(start, end)) in occurrences.iter().enumerate() {
                let stop = occurrences.get(k + 1).map(|o| o.0).unwrap_or(line.len());
                let context = context_noun(&line[..start]);

                let mut values = values_after_keyword(&line[end..stop], line_offsets[idx] + end);
                if values.is_empty() {
                    trace!("No same-line value after {:?}, scanning below", &line[start..end]);
                    values = vertical_values(&lines, &line_offsets, idx);
                }

                for v in values {
                    found.push(
                        SerialCandidate::new(v.value, v.source, v.offset).with_context(context),
                    );
                }
            }
        }

        found.sort_by_key(|c| c.position);
        dedup_candidates(found)
    }
}

impl Default for SerialResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for SerialResolver {
    type Output = SerialCandidate;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.scan(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.scan(text)
    }
}

/// Keyword spans on one line.
///
/// An occurrence that directly follows another one (only separators in
/// between) is the previous keyword's value, as in `S/N: SN-001`. After the
/// first keyword, an occurrence that starts a valid serial token is a list
/// entry (`Serial No. SN-001, SN-002`). A keyword hyphen-joined to its
/// digits (`SN-2000`) is a model designation when another keyword follows
/// on the line.
pub(crate) fn keyword_occurrences(line: &str) -> Vec<(usize, usize)> {
    let matches: Vec<_> = SERIAL_KEYWORD.find_iter(line).collect();
    let mut kept: Vec<(usize, usize)> = Vec::new();
    for (i, m) in matches.iter().enumerate() {
        if i + 1 < matches.len()
            && m.as_str().chars().all(|c| c.is_ascii_alphanumeric())
            && line[m.end()..].starts_with('-')
            && starts_serial_token(&line[m.start()..])
        {
            continue;
        }
        if let Some(&(_, prev_end)) = kept.last() {
            let gap = &line[prev_end..m.start()];
            if KEYWORD_SEPARATOR.find(gap).map(|s| s.end()) == Some(gap.len()) {
                continue;
            }
            if starts_serial_token(&line[m.start()..]) {
                continue;
            }
        }
        kept.push((m.start(), m.end()));
    }
    kept
}

fn starts_serial_token(rest: &str) -> bool {
    let token = rest
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .next()
        .unwrap_or("");
    STANDALONE_TOKEN.is_match(token) && is_valid_serial(token)
}

/// Values in the text that follows a keyword on the same line.
pub(crate) fn values_after_keyword(remainder: &str, base: usize) -> Vec<LocatedValue> {
    let skip = KEYWORD_SEPARATOR
        .find(remainder)
        .map(|m| m.end())
        .unwrap_or(0);
    segment_values(&remainder[skip..], base + skip, SerialSource::SameLine)
}

/// Split a value list into segments and keep the ones that validate.
pub(crate) fn segment_values(body: &str, base: usize, source: SerialSource) -> Vec<LocatedValue> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in SEGMENT_SPLIT.find_iter(body) {
        segments.push((last, &body[last..m.start()]));
        last = m.end();
    }
    segments.push((last, &body[last..]));

    segments
        .into_iter()
        .filter_map(|(off, segment)| {
            let trimmed = segment.trim_start();
            let lead = segment.len() - trimmed.len();
            let token = SERIAL_VALUE.find(trimmed)?;
            classify(token.as_str(), source).map(|(value, source)| LocatedValue {
                value,
                source,
                offset: base + off + lead,
            })
        })
        .collect()
}

/// Standalone tokens on the lines below a bare keyword.
fn vertical_values(lines: &[&str], offsets: &[usize], idx: usize) -> Vec<LocatedValue> {
    let mut values = Vec::new();
    let end = (idx + 1 + VERTICAL_SCAN_LINES).min(lines.len());

    for j in idx + 1..end {
        let line = lines[j];
        if has_serial_keyword(line) {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let pieces: Vec<&str> = trimmed.split([',', ';']).map(str::trim).collect();
        let standalone = pieces
            .iter()
            .all(|p| STANDALONE_TOKEN.is_match(p) || RANGE_VALUE.is_match(p));
        if !standalone {
            continue;
        }

        for piece in pieces {
            let offset = offsets[j] + piece.as_ptr() as usize - line.as_ptr() as usize;
            if let Some((value, source)) = classify(piece, SerialSource::VerticalScan) {
                values.push(LocatedValue {
                    value,
                    source,
                    offset,
                });
            }
        }
    }
    values
}

/// Normalize a token and decide whether it is a range, a plain value or noise.
fn classify(token: &str, source: SerialSource) -> Option<(String, SerialSource)> {
    if let Some(caps) = RANGE_VALUE.captures(token) {
        if same_shape(&caps[1], &caps[2]) {
            let value = format!("{}-{}", &caps[1], &caps[2]);
            return is_valid_serial(&value).then_some((value, SerialSource::Range));
        }
    }

    let value: String = token.split_whitespace().collect();
    if is_valid_serial(&value) {
        Some((value, source))
    } else {
        trace!("Rejected serial candidate {:?}", value);
        None
    }
}

/// Range ends must have equal length and the same letter/digit layout.
fn same_shape(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .zip(b.chars())
            .all(|(x, y)| x.is_ascii_digit() == y.is_ascii_digit())
}

/// Length, digit and noise checks shared by text and table resolution.
pub fn is_valid_serial(value: &str) -> bool {
    if value.chars().count() < MIN_SERIAL_LEN {
        return false;
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    let lower = value.to_lowercase();
    if ADDRESS_TERMS.iter().any(|t| lower.contains(&t.to_lowercase())) {
        return false;
    }
    if QUANTITY_LABELS.iter().any(|q| q.eq_ignore_ascii_case(value)) {
        return false;
    }
    if FRACTION.is_match(value) {
        return false;
    }
    if lower.contains("www.") || lower.contains(".com") || lower.starts_with("http") {
        return false;
    }
    true
}

/// Component noun closest to the keyword within the context window.
pub(crate) fn context_noun(before: &str) -> Option<&'static str> {
    let start = before
        .char_indices()
        .rev()
        .nth(CONTEXT_WINDOW - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let found = CONTEXT_NOUN.find_iter(&before[start..]).last()?;
    CONTEXT_NOUNS
        .iter()
        .copied()
        .find(|n| n.eq_ignore_ascii_case(found.as_str()))
}

/// Collapse candidates with equal case-insensitive values, keeping input
/// order. A kept candidate without context adopts the first context seen on
/// one of its duplicates.
pub fn dedup_candidates(candidates: Vec<SerialCandidate>) -> Vec<SerialCandidate> {
    let mut kept: Vec<SerialCandidate> = Vec::with_capacity(candidates.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for candidate in candidates {
        match index.get(&candidate.key()) {
            Some(&i) => {
                if kept[i].context.is_none() && candidate.context.is_some() {
                    kept[i].context = candidate.context;
                }
            }
            None => {
                index.insert(candidate.key(), kept.len());
                kept.push(candidate);
            }
        }
    }
    kept
}
