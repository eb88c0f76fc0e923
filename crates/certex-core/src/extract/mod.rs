//! Hybrid date and serial-number extraction.

pub mod completeness;
pub mod merge;
pub mod pipeline;
pub mod rules;

pub use completeness::{CompletenessEvaluator, CompletenessReport};
pub use merge::{merge, MergeInput, PassOutput, StageOutcome};
pub use pipeline::{DocumentInput, HybridExtractor};
pub use rules::{DateResolver, FieldExtractor, SerialResolver, TableResolver};
