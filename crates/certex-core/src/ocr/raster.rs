//! Page rasterization through the external `pdftoppm` tool.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{DocumentKind, DocumentSource};

/// Rendered page images of one document, in page order.
///
/// Rendered files live in a temporary directory that is removed when this
/// value is dropped.
pub struct PageImages {
    pages: Vec<PathBuf>,
    _temp_dir: Option<TempDir>,
}

impl PageImages {
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }
}

/// Renders every page of a PDF to PNG at a fixed resolution.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    command: String,
    dpi: u32,
}

impl Rasterizer {
    pub fn new(command: impl Into<String>, dpi: u32) -> Self {
        Self {
            command: command.into(),
            dpi,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.pdftoppm_cmd.clone(), config.render_dpi)
    }

    /// Page images for a document. Images pass through as their single page.
    pub fn rasterize(&self, source: &DocumentSource) -> Result<PageImages, OcrError> {
        match source.kind {
            DocumentKind::Image => Ok(PageImages {
                pages: vec![source.path.clone()],
                _temp_dir: None,
            }),
            DocumentKind::Pdf => self.render_pdf(&source.path),
        }
    }

    fn render_pdf(&self, pdf_path: &Path) -> Result<PageImages, OcrError> {
        let temp_dir = TempDir::new()
            .map_err(|e| OcrError::Rasterize(format!("failed to create temp dir: {}", e)))?;
        let output_prefix = temp_dir.path().join("page");

        let output = Command::new(&self.command)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf_path)
            .arg(&output_prefix)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    OcrError::Unavailable(format!("{} not found", self.command))
                }
                _ => OcrError::Rasterize(format!("{}: {}", self.command, e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Rasterize(format!(
                "{} failed: {}",
                self.command,
                stderr.trim()
            )));
        }

        let entries = std::fs::read_dir(temp_dir.path())
            .map_err(|e| OcrError::Rasterize(format!("failed to list pages: {}", e)))?;
        let mut pages: Vec<(u32, PathBuf)> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter_map(|path| page_number(&path).map(|n| (n, path)))
            .collect();
        pages.sort();

        if pages.is_empty() {
            return Err(OcrError::Rasterize(format!(
                "no pages rendered from {}",
                pdf_path.display()
            )));
        }

        debug!(
            "Rendered {} pages of {} at {} DPI",
            pages.len(),
            pdf_path.display(),
            self.dpi
        );

        Ok(PageImages {
            pages: pages.into_iter().map(|(_, path)| path).collect(),
            _temp_dir: Some(temp_dir),
        })
    }
}

/// Page number of a `pdftoppm` output file such as `page-07.png`.
fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('-').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-012.png")), Some(12));
        assert_eq!(page_number(Path::new("/tmp/x/page-1.ppm")), None);
        assert_eq!(page_number(Path::new("/tmp/x/notes.png")), None);
    }

    #[test]
    fn test_image_is_single_page() {
        let source = DocumentSource::new("scan.jpg", DocumentKind::Image);
        let pages = Rasterizer::new("pdftoppm", 300).rasterize(&source).unwrap();
        assert_eq!(pages.pages(), &[PathBuf::from("scan.jpg")]);
    }

    #[test]
    fn test_missing_rasterizer_is_unavailable() {
        let source = DocumentSource::new("doc.pdf", DocumentKind::Pdf);
        let result = Rasterizer::new("certex-no-such-pdftoppm", 300).rasterize(&source);
        assert!(matches!(result, Err(OcrError::Unavailable(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_rasterizer_is_rasterize_error() {
        let source = DocumentSource::new("doc.pdf", DocumentKind::Pdf);
        let result = Rasterizer::new("false", 300).rasterize(&source);
        assert!(matches!(result, Err(OcrError::Rasterize(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_no_rendered_pages_is_rasterize_error() {
        let source = DocumentSource::new("doc.pdf", DocumentKind::Pdf);
        let result = Rasterizer::new("true", 300).rasterize(&source);
        assert!(matches!(result, Err(OcrError::Rasterize(_))));
    }
}
