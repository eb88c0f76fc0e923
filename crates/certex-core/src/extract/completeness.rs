//! Decides whether the digital pass is enough or OCR must run.
//!
//! Each trigger is a named predicate; OCR runs when any of them holds.

use crate::models::config::ExtractionConfig;
use crate::models::corpus::TextCorpus;

use super::merge::PassOutput;

/// Corpus too short to be a digital document.
pub fn is_scanned(corpus: &TextCorpus, min_text_length: usize) -> bool {
    corpus.text_len() < min_text_length
}

/// No date and no serial from either the text or the tables.
pub fn is_critical_data_missing(digital: &PassOutput, table: &PassOutput) -> bool {
    digital.date.is_none()
        && table.date.is_none()
        && digital.serials.is_empty()
        && table.serials.is_empty()
}

/// Some page carries more embedded images than the threshold.
pub fn is_image_heavy(corpus: &TextCorpus, threshold: usize) -> bool {
    corpus.max_page_images() > threshold
}

/// Outcome of every trigger for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletenessReport {
    pub scanned: bool,
    pub critical_missing: bool,
    pub image_heavy: bool,
    pub forced: bool,
}

impl CompletenessReport {
    pub fn requires_ocr(&self) -> bool {
        self.scanned || self.critical_missing || self.image_heavy || self.forced
    }

    /// Names of the triggers that fired, for logging.
    pub fn reasons(&self) -> Vec<&'static str> {
        [
            (self.scanned, "scanned"),
            (self.critical_missing, "critical data missing"),
            (self.image_heavy, "image-heavy page"),
            (self.forced, "forced"),
        ]
        .into_iter()
        .filter_map(|(fired, name)| fired.then_some(name))
        .collect()
    }
}

/// Completeness evaluator.
pub struct CompletenessEvaluator {
    min_text_length: usize,
    image_heavy_threshold: usize,
    force_ocr: bool,
}

impl CompletenessEvaluator {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
            image_heavy_threshold: config.image_heavy_threshold,
            force_ocr: config.force_ocr,
        }
    }

    /// Evaluate the digital pass. `force` is OR-ed with the configured flag.
    pub fn evaluate(
        &self,
        corpus: &TextCorpus,
        digital: &PassOutput,
        table: &PassOutput,
        force: bool,
    ) -> CompletenessReport {
        CompletenessReport {
            scanned: is_scanned(corpus, self.min_text_length),
            critical_missing: is_critical_data_missing(digital, table),
            image_heavy: is_image_heavy(corpus, self.image_heavy_threshold),
            forced: force || self.force_ocr,
        }
    }
}

impl Default for CompletenessEvaluator {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::corpus::CorpusPage;
    use crate::models::result::{SerialCandidate, SerialSource};

    fn with_serial() -> PassOutput {
        PassOutput {
            date: None,
            serials: vec![SerialCandidate::new("A1234", SerialSource::SameLine, 0)],
        }
    }

    #[test]
    fn test_short_text_is_scanned() {
        assert!(is_scanned(&TextCorpus::from_text("A1234"), 10));
        assert!(is_scanned(&TextCorpus::from_text("  a b  \n c "), 10));
        assert!(!is_scanned(&TextCorpus::from_text("Ref No. A123 issued"), 10));
    }

    #[test]
    fn test_critical_data_missing() {
        let empty = PassOutput::default();
        assert!(is_critical_data_missing(&empty, &empty));
        assert!(!is_critical_data_missing(&with_serial(), &empty));
        assert!(!is_critical_data_missing(&empty, &with_serial()));
    }

    #[test]
    fn test_image_heavy_threshold() {
        let corpus = TextCorpus::new(vec![
            CorpusPage {
                text: "page one".into(),
                image_count: 1,
            },
            CorpusPage {
                text: "page two".into(),
                image_count: 3,
            },
        ]);
        assert!(is_image_heavy(&corpus, 2));
        assert!(!is_image_heavy(&corpus, 3));
    }

    #[test]
    fn test_short_corpus_always_triggers() {
        let report = CompletenessEvaluator::default().evaluate(
            &TextCorpus::from_text("A1234"),
            &with_serial(),
            &PassOutput::default(),
            false,
        );
        assert!(report.scanned);
        assert!(report.requires_ocr());
        assert_eq!(report.reasons(), vec!["scanned"]);
    }

    #[test]
    fn test_complete_digital_pass() {
        let report = CompletenessEvaluator::default().evaluate(
            &TextCorpus::from_text("Certificate No. XYZ987"),
            &with_serial(),
            &PassOutput::default(),
            false,
        );
        assert!(!report.requires_ocr());
        assert!(report.reasons().is_empty());
    }

    #[test]
    fn test_force_flag() {
        let config = ExtractionConfig {
            force_ocr: true,
            ..Default::default()
        };
        let report = CompletenessEvaluator::new(&config).evaluate(
            &TextCorpus::from_text("Certificate No. XYZ987"),
            &with_serial(),
            &PassOutput::default(),
            false,
        );
        assert!(report.forced);
        assert!(report.requires_ocr());
    }
}
