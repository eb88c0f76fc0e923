//! OCR bridges: rasterize a document and recognize text page by page.

mod raster;
mod tesseract;

#[cfg(feature = "onnx")]
mod pure_engine;

pub use raster::{PageImages, Rasterizer};
pub use tesseract::TesseractBridge;

#[cfg(feature = "onnx")]
pub use pure_engine::OnnxBridge;

use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::error::{OcrError, PdfError};
use crate::models::config::{OcrConfig, OcrEngineKind};
use crate::models::corpus::TextCorpus;

/// Accepted document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    /// JPEG or PNG; treated as a single page.
    Image,
}

impl DocumentKind {
    /// Kind from a declared MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.eq_ignore_ascii_case("application/pdf") {
            return Some(Self::Pdf);
        }
        match ImageFormat::from_mime_type(mime) {
            Some(ImageFormat::Jpeg | ImageFormat::Png) => Some(Self::Image),
            _ => None,
        }
    }

    /// Kind inferred from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pdf") {
            return Some(Self::Pdf);
        }
        match ImageFormat::from_extension(ext) {
            Some(ImageFormat::Jpeg | ImageFormat::Png) => Some(Self::Image),
            _ => None,
        }
    }
}

/// A readable document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl DocumentSource {
    pub fn new(path: impl Into<PathBuf>, kind: DocumentKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Source with its kind inferred from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, PdfError> {
        let path = path.into();
        let kind = DocumentKind::from_path(&path)
            .ok_or_else(|| PdfError::UnsupportedType(path.display().to_string()))?;
        Ok(Self { path, kind })
    }
}

/// Rasterizer + recognizer pair producing a corpus for a whole document.
///
/// A page that fails recognition must come back as empty text rather than
/// failing the document. `Err` is reserved for the bridge being unable to
/// run at all.
pub trait OcrBridge: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    fn recognize(&self, source: &DocumentSource) -> Result<TextCorpus, OcrError>;
}

/// Build the bridge selected in the configuration.
pub fn bridge_from_config(config: &OcrConfig) -> Result<Box<dyn OcrBridge>, OcrError> {
    match config.engine {
        OcrEngineKind::Tesseract => Ok(Box::new(TesseractBridge::new(config.clone()))),
        #[cfg(feature = "onnx")]
        OcrEngineKind::Onnx => Ok(Box::new(OnnxBridge::from_dir(
            &config.model_dir,
            config.clone(),
        )?)),
        #[cfg(not(feature = "onnx"))]
        OcrEngineKind::Onnx => Err(OcrError::Unavailable(
            "built without the `onnx` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(DocumentKind::from_mime("application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_mime("image/jpeg"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_mime("image/png"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_mime("text/plain"), None);
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(DocumentKind::from_path(Path::new("a/cert.PDF")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("scan.jpg")), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_path(Path::new("scan.png")), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_path(Path::new("notes.docx")), None);
        assert!(DocumentSource::from_path("noext").is_err());
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_needs_feature() {
        let config = OcrConfig {
            engine: OcrEngineKind::Onnx,
            ..Default::default()
        };
        assert!(matches!(bridge_from_config(&config), Err(OcrError::Unavailable(_))));
    }
}
