//! OCR bridge backed by the external `tesseract` binary.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::OcrConfig;
use crate::models::corpus::{CorpusPage, TextCorpus};

use super::{DocumentSource, OcrBridge, Rasterizer};

/// Rasterizes with `pdftoppm`, then runs `tesseract` once per page.
pub struct TesseractBridge {
    config: OcrConfig,
    rasterizer: Rasterizer,
}

impl TesseractBridge {
    pub fn new(config: OcrConfig) -> Self {
        let rasterizer = Rasterizer::from_config(&config);
        Self { config, rasterizer }
    }

    /// Page segmentation mode: automatic with OSD, or automatic without.
    fn psm(&self) -> &'static str {
        if self.config.detect_orientation { "1" } else { "3" }
    }

    fn recognize_page(&self, image: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.config.tesseract_cmd)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(self.psm())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    OcrError::Unavailable(format!("{} not found", self.config.tesseract_cmd))
                }
                _ => OcrError::Recognition(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrBridge for TesseractBridge {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, source: &DocumentSource) -> Result<TextCorpus, OcrError> {
        let start = Instant::now();
        let images = self.rasterizer.rasterize(source)?;

        let mut pages = Vec::with_capacity(images.pages().len());
        for (i, image) in images.pages().iter().enumerate() {
            let text = match self.recognize_page(image) {
                Ok(text) => text,
                Err(e @ OcrError::Unavailable(_)) => return Err(e),
                Err(e) => {
                    warn!("OCR failed on page {} of {}: {}", i + 1, source.path.display(), e);
                    String::new()
                }
            };
            debug!("Page {}: {} chars recognized", i + 1, text.len());
            pages.push(CorpusPage {
                text,
                image_count: 1,
            });
        }

        info!(
            "OCR complete: {} pages in {}ms",
            pages.len(),
            start.elapsed().as_millis()
        );

        Ok(TextCorpus::new(pages))
    }
}
