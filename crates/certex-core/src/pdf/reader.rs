//! Digital text reader using lopdf, with pdf-extract as a fallback.

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::Result;
use crate::error::PdfError;
use crate::models::corpus::{CorpusPage, TextCorpus};

/// Per-page digital text and image counts of a PDF.
pub struct PdfReader {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfReader {
    /// Load a PDF from bytes. Documents encrypted with an empty password
    /// are decrypted.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self {
            document: doc,
            raw_data,
        })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Build the digital corpus: one entry per page, in page order.
    pub fn corpus(&self) -> TextCorpus {
        let pages: Vec<(u32, ObjectId)> = self.document.get_pages().into_iter().collect();

        let mut texts: Vec<String> = pages
            .iter()
            .map(|(number, _)| {
                self.document.extract_text(&[*number]).unwrap_or_else(|e| {
                    trace!("lopdf text extraction failed on page {}: {}", number, e);
                    String::new()
                })
            })
            .collect();

        if texts.iter().all(|t| t.trim().is_empty()) {
            match self.fallback_text() {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("Using pdf-extract fallback text");
                    texts = distribute_pages(&text, texts.len());
                }
                Ok(_) => {}
                Err(e) => debug!("pdf-extract fallback failed: {}", e),
            }
        }

        let corpus_pages = pages
            .iter()
            .zip(texts)
            .map(|((number, id), text)| {
                let image_count = self.page_image_count(*id);
                trace!("Page {}: {} chars, {} images", number, text.len(), image_count);
                CorpusPage { text, image_count }
            })
            .collect();

        TextCorpus::new(corpus_pages)
    }

    fn fallback_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Number of image XObjects referenced by a page.
    fn page_image_count(&self, page_id: ObjectId) -> usize {
        let doc = &self.document;
        let Some(resources) = page_resources(doc, page_id) else {
            return 0;
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return 0;
        };
        let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) else {
            return 0;
        };

        xobj_dict
            .iter()
            .filter_map(|(_, obj_ref)| doc.dereference(obj_ref).ok())
            .filter(|(_, obj)| is_image(obj))
            .count()
    }
}

/// Whole-document fallback text split into pages on form feeds when the
/// page count matches; otherwise everything lands on the first page.
fn distribute_pages(text: &str, page_count: usize) -> Vec<String> {
    let parts: Vec<&str> = text.split('\u{c}').collect();
    if parts.len() == page_count {
        return parts.into_iter().map(str::to_string).collect();
    }
    let mut pages = vec![String::new(); page_count.max(1)];
    pages[0] = text.to_string();
    pages
}

fn is_image(obj: &Object) -> bool {
    match obj {
        Object::Stream(stream) => stream
            .dict
            .get(b"Subtype")
            .and_then(|s| s.as_name())
            .map(|name| name == b"Image")
            .unwrap_or(false),
        _ => false,
    }
}

/// Resources dictionary of a page, inherited through the page tree.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    /// One page with `image_count` image XObjects in its inherited resources.
    fn build_pdf(image_count: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });

        let mut xobjects = Dictionary::new();
        for i in 0..image_count {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 1,
                    "Height" => 1,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0],
            ));
            xobjects.set(format!("Im{}", i), image_id);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => xobjects,
        });

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal("Ref No. A123")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            PdfReader::load(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_page_count_and_images() {
        let reader = PdfReader::load(&build_pdf(3)).unwrap();
        assert_eq!(reader.page_count(), 1);

        let corpus = reader.corpus();
        assert_eq!(corpus.page_count(), 1);
        assert_eq!(corpus.max_page_images(), 3);
    }

    #[test]
    fn test_text_only_page_has_no_images() {
        let corpus = PdfReader::load(&build_pdf(0)).unwrap().corpus();
        assert_eq!(corpus.max_page_images(), 0);
    }

    #[test]
    fn test_distribute_pages() {
        assert_eq!(distribute_pages("a\u{c}b", 2), vec!["a", "b"]);
        assert_eq!(distribute_pages("a\u{c}b", 3), vec!["a\u{c}b", "", ""]);
    }
}
