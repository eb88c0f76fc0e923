//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CertexError, Result};

/// Main configuration for the certex pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertexConfig {
    /// Completeness evaluation settings.
    pub extraction: ExtractionConfig,

    /// OCR bridge configuration.
    pub ocr: OcrConfig,
}

/// Settings for deciding when the digital pass is not enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Below this many non-whitespace characters a document counts as scanned.
    pub min_text_length: usize,

    /// A page with more images than this is image-heavy.
    pub image_heavy_threshold: usize,

    /// Always run the OCR pass.
    pub force_ocr: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 10,
            image_heavy_threshold: 2,
            force_ocr: false,
        }
    }
}

/// Which recognizer backs the OCR bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    /// External `tesseract` binary.
    #[default]
    Tesseract,
    /// Pure-Rust PaddleOCR models (requires the `onnx` feature).
    Onnx,
}

/// OCR bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Recognizer to use.
    pub engine: OcrEngineKind,

    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Tesseract language code.
    pub language: String,

    /// Run orientation and script detection before recognition.
    pub detect_orientation: bool,

    /// Path or name of the tesseract binary.
    pub tesseract_cmd: String,

    /// Path or name of the pdftoppm binary.
    pub pdftoppm_cmd: String,

    /// Documents OCR'd concurrently in batch mode (0 = CPU cores).
    pub workers: usize,

    /// Model directory for the `onnx` engine.
    pub model_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::Tesseract,
            render_dpi: 300,
            language: "eng".to_string(),
            detect_orientation: true,
            tesseract_cmd: "tesseract".to_string(),
            pdftoppm_cmd: "pdftoppm".to_string(),
            workers: 0,
            model_dir: PathBuf::from("models"),
        }
    }
}

impl OcrConfig {
    /// Effective worker count.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

impl CertexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CertexError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CertexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
