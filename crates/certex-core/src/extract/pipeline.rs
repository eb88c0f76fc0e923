//! Hybrid extraction pipeline: digital pass, completeness check, optional
//! OCR pass, merge.

use tracing::{debug, info, warn};

use crate::error::{ExtractionError, OcrError, Result};
use crate::models::config::ExtractionConfig;
use crate::models::corpus::{TableGrid, TextCorpus};
use crate::models::result::{ExtractionResult, SerialSource};
use crate::ocr::{DocumentSource, OcrBridge};

use super::completeness::CompletenessEvaluator;
use super::merge::{merge, MergeInput, PassOutput, StageOutcome};
use super::rules::{DateResolver, SerialResolver, TableResolver};

/// Everything the engine knows about one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentInput {
    /// Digital text, if a reader produced any.
    pub corpus: Option<TextCorpus>,
    pub tables: TableGrid,
    /// Document on disk, needed for the OCR pass.
    pub source: Option<DocumentSource>,
    pub force_ocr: bool,
}

impl DocumentInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_corpus(mut self, corpus: TextCorpus) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn with_tables(mut self, tables: TableGrid) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_source(mut self, source: DocumentSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_force_ocr(mut self, force: bool) -> Self {
        self.force_ocr = force;
        self
    }
}

/// The extraction engine.
///
/// Holds no per-document state; one instance can serve many documents
/// concurrently.
pub struct HybridExtractor {
    evaluator: CompletenessEvaluator,
    dates: DateResolver,
    serials: SerialResolver,
    tables: TableResolver,
    bridge: Option<Box<dyn OcrBridge>>,
}

impl HybridExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            evaluator: CompletenessEvaluator::new(config),
            dates: DateResolver::new(),
            serials: SerialResolver::new(),
            tables: TableResolver::new(),
            bridge: None,
        }
    }

    /// Attach the OCR bridge used when the digital pass is incomplete.
    pub fn with_bridge(mut self, bridge: Box<dyn OcrBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Extract the date and serial numbers of one document.
    ///
    /// Only a malformed invocation (no corpus and no way to OCR) is an
    /// error; every other shortfall is encoded in the result's method tag.
    pub fn extract(&self, input: &DocumentInput) -> Result<ExtractionResult> {
        if input.corpus.is_none() && (self.bridge.is_none() || input.source.is_none()) {
            return Err(ExtractionError::MalformedInvocation(
                "no digital corpus and no OCR bridge with a document source".to_string(),
            )
            .into());
        }

        let empty = TextCorpus::default();
        let corpus = input.corpus.as_ref().unwrap_or(&empty);

        let digital = self.text_pass(corpus);
        let table = PassOutput {
            date: self.tables.resolve_date(&input.tables),
            serials: self.tables.resolve(&input.tables),
        };

        let report = self
            .evaluator
            .evaluate(corpus, &digital, &table, input.force_ocr);
        debug!(
            "Digital pass: date={}, {} text serials, {} table serials",
            digital.date.is_some(),
            digital.serials.len(),
            table.serials.len()
        );

        let ocr = if report.requires_ocr() {
            info!("OCR required: {}", report.reasons().join(", "));
            Some(self.ocr_stage(input.source.as_ref()))
        } else {
            None
        };

        let result = merge(&MergeInput {
            digital: StageOutcome::from_pass(digital),
            table: StageOutcome::from_pass(table),
            ocr,
            scanned: report.scanned,
        });

        debug!(
            "Result: date={:?}, {} serials, method={}",
            result.date,
            result.serial_numbers.len(),
            result.method
        );
        Ok(result)
    }

    fn text_pass(&self, corpus: &TextCorpus) -> PassOutput {
        PassOutput {
            date: self.dates.resolve(corpus),
            serials: self.serials.resolve(corpus),
        }
    }

    fn ocr_stage(&self, source: Option<&DocumentSource>) -> StageOutcome<PassOutput> {
        let (Some(bridge), Some(source)) = (self.bridge.as_deref(), source) else {
            warn!("OCR required but no bridge or document source is available");
            return StageOutcome::Unavailable;
        };

        let corpus = match bridge.recognize(source) {
            Ok(corpus) => corpus,
            Err(OcrError::Unavailable(reason)) => {
                warn!("{} unavailable: {}", bridge.name(), reason);
                return StageOutcome::Unavailable;
            }
            Err(e) => {
                warn!("{} failed on {}: {}", bridge.name(), source.path.display(), e);
                return StageOutcome::Unavailable;
            }
        };

        debug!(
            "{} recognized {} chars over {} pages",
            bridge.name(),
            corpus.text_len(),
            corpus.page_count()
        );

        let mut pass = self.text_pass(&corpus);
        for candidate in &mut pass.serials {
            candidate.source = SerialSource::Ocr;
        }
        StageOutcome::from_pass(pass)
    }
}

impl Default for HybridExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}
