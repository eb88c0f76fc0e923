//! Rule-based field resolvers for certificates.

pub mod dates;
pub mod patterns;
pub mod serials;
pub mod table;

pub use dates::DateResolver;
pub use serials::{dedup_candidates, is_valid_serial, SerialResolver};
pub use table::TableResolver;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
