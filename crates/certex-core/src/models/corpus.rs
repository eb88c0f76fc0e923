//! Input corpora handed to the extraction engine.

use serde::{Deserialize, Serialize};

/// Ordered per-page text of one document plus per-page image counts.
///
/// Built once per document by a reader or OCR bridge and never mutated
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCorpus {
    pages: Vec<CorpusPage>,
}

/// A single page of a [`TextCorpus`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusPage {
    /// Text extracted from the page (may be empty).
    pub text: String,
    /// Number of embedded images on the page.
    pub image_count: usize,
}

impl TextCorpus {
    /// Build a corpus from pages.
    pub fn new(pages: Vec<CorpusPage>) -> Self {
        Self { pages }
    }

    /// Build a corpus from page texts with no image information.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: texts
                .into_iter()
                .map(|t| CorpusPage {
                    text: t.into(),
                    image_count: 0,
                })
                .collect(),
        }
    }

    /// Single-page corpus from one text blob.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_texts([text])
    }

    /// An image document: one implicit page, no text, one image.
    pub fn single_image() -> Self {
        Self {
            pages: vec![CorpusPage {
                text: String::new(),
                image_count: 1,
            }],
        }
    }

    pub fn pages(&self) -> &[CorpusPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages joined with newlines, in page order.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Pages joined with `--- Page N ---` boundary markers.
    pub fn marked_text(&self) -> String {
        let mut out = String::new();
        for (i, page) in self.pages.iter().enumerate() {
            out.push_str(&format!("\n--- Page {} ---\n", i + 1));
            out.push_str(&page.text);
        }
        out
    }

    /// Number of non-whitespace characters across all pages.
    pub fn text_len(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.text.chars().filter(|c| !c.is_whitespace()).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.text_len() == 0
    }

    /// Largest image count found on any page.
    pub fn max_page_images(&self) -> usize {
        self.pages.iter().map(|p| p.image_count).max().unwrap_or(0)
    }
}

/// Tables of one document: tables → rows → non-empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGrid {
    tables: Vec<Table>,
}

/// One table as rows of cell strings.
pub type Table = Vec<Vec<String>>;

impl TableGrid {
    /// Ingest raw tables. Cells are trimmed and empty cells dropped.
    pub fn new<T, R, C>(tables: T) -> Self
    where
        T: IntoIterator<Item = R>,
        R: IntoIterator<Item = Vec<C>>,
        C: AsRef<str>,
    {
        let tables = tables
            .into_iter()
            .map(|rows| {
                rows.into_iter()
                    .map(|row| {
                        row.iter()
                            .map(|c| c.as_ref().trim())
                            .filter(|c| !c.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .collect()
            })
            .collect();
        Self { tables }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.iter().all(|r| r.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_len_ignores_whitespace() {
        let corpus = TextCorpus::from_texts(["  a b \n", "c"]);
        assert_eq!(corpus.text_len(), 3);
        assert_eq!(corpus.text(), "  a b \n\nc");
    }

    #[test]
    fn test_marked_text_keeps_page_boundaries() {
        let corpus = TextCorpus::from_texts(["first", "second"]);
        let marked = corpus.marked_text();
        assert!(marked.contains("--- Page 1 ---\nfirst"));
        assert!(marked.contains("--- Page 2 ---\nsecond"));
    }

    #[test]
    fn test_table_grid_drops_empty_cells() {
        let grid = TableGrid::new(vec![vec![
            vec!["Serial No", ""],
            vec![" SN-1 ", "  "],
        ]]);
        assert_eq!(grid.tables()[0][0], vec!["Serial No".to_string()]);
        assert_eq!(grid.tables()[0][1], vec!["SN-1".to_string()]);
    }

    #[test]
    fn test_single_image_corpus() {
        let corpus = TextCorpus::single_image();
        assert_eq!(corpus.page_count(), 1);
        assert_eq!(corpus.max_page_images(), 1);
        assert!(corpus.is_empty());
    }
}
