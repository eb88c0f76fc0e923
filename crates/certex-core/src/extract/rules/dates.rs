//! Date resolution: first calendar-valid match, normalized to DD/MM/YYYY.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use tracing::trace;

use super::patterns::{
    month_number, DATE_DAY_MONTH_NAME, DATE_DMY, DATE_DMY_DOTTED, DATE_LABELED, DATE_MONTH_NAME,
    DATE_YMD,
};
use super::FieldExtractor;
use crate::models::corpus::TextCorpus;
use crate::models::result::DateCandidate;

/// Order of the numeric/textual groups in a date pattern.
#[derive(Debug, Clone, Copy)]
enum Layout {
    DayMonthYear,
    YearMonthDay,
    MonthNameDayYear,
    DayMonthNameYear,
}

/// Date resolver.
pub struct DateResolver;

impl DateResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the document date from a corpus.
    pub fn resolve(&self, corpus: &TextCorpus) -> Option<DateCandidate> {
        self.extract(&corpus.text())
    }

    /// Normalize a free-standing date string (e.g. a search query).
    pub fn normalize(&self, text: &str) -> Option<String> {
        self.extract(text).map(|c| c.normalized())
    }

    fn patterns() -> [(&'static Regex, Layout); 5] {
        [
            (&*DATE_DMY, Layout::DayMonthYear),
            (&*DATE_YMD, Layout::YearMonthDay),
            (&*DATE_MONTH_NAME, Layout::MonthNameDayYear),
            (&*DATE_DMY_DOTTED, Layout::DayMonthYear),
            (&*DATE_DAY_MONTH_NAME, Layout::DayMonthNameYear),
        ]
    }

    fn scan(&self, text: &str) -> Vec<DateCandidate> {
        let mut results = Vec::new();
        for (pattern, layout) in Self::patterns() {
            for caps in pattern.captures_iter(text) {
                let Some(full) = caps.get(0) else { continue };
                match parse_captures(&caps, layout) {
                    Some(date) => results.push(DateCandidate {
                        raw: full.as_str().to_string(),
                        span: (full.start(), full.end()),
                        date,
                    }),
                    None => trace!("Discarding invalid date {:?}", full.as_str()),
                }
            }
        }
        results
    }

    fn labeled(&self, text: &str) -> Option<DateCandidate> {
        let caps = DATE_LABELED.captures(text)?;
        let value = caps.get(1)?;
        let cleaned = value.as_str().replace(['.', ' '], "/").replace("//", "/");
        let date = self
            .scan(&cleaned)
            .into_iter()
            .next()
            .map(|c| c.date)?;
        Some(DateCandidate {
            raw: value.as_str().trim().to_string(),
            span: (value.start(), value.end()),
            date,
        })
    }
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateResolver {
    type Output = DateCandidate;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        // Patterns are tried in priority order; within a pattern, top to bottom.
        self.scan(text)
            .into_iter()
            .next()
            .or_else(|| self.labeled(text))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.scan(text)
    }
}

fn parse_captures(caps: &Captures<'_>, layout: Layout) -> Option<NaiveDate> {
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (year, month, day) = match layout {
        Layout::DayMonthYear => (num(3)?, num(2)?, num(1)?),
        Layout::YearMonthDay => (num(1)?, num(2)?, num(3)?),
        Layout::MonthNameDayYear => (num(3)?, month_number(caps.get(1)?.as_str())?, num(2)?),
        Layout::DayMonthNameYear => (num(3)?, month_number(caps.get(2)?.as_str())?, num(1)?),
    };
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}
