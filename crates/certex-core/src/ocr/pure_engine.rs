//! OCR bridge using `pure-onnx-ocr` (pure Rust PaddleOCR, no external runtime).

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::OcrConfig;
use crate::models::corpus::{CorpusPage, TextCorpus};

use super::{DocumentSource, OcrBridge, Rasterizer};

/// A recognized line with its axis-aligned box.
struct TextLine {
    text: String,
    /// (min_x, min_y)
    origin: (f32, f32),
}

/// OCR bridge backed by `pure-onnx-ocr`, rasterizing with `pdftoppm`.
pub struct OnnxBridge {
    engine: pure_onnx_ocr::engine::OcrEngine,
    rasterizer: Rasterizer,
}

impl OnnxBridge {
    /// Create a bridge from model files in a directory.
    pub fn from_dir(model_dir: &Path, config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine,
            rasterizer: Rasterizer::from_config(&config),
        })
    }

    /// Recognize one page image; lines come back in reading order.
    fn recognize_image(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let mut lines: Vec<TextLine> = results
            .iter()
            .map(|r| TextLine {
                text: r.text.replace("[UNK]", " "),
                origin: polygon_origin(&r.bounding_box),
            })
            .collect();

        // Group by approximate vertical position (within 20 pixels), then x.
        lines.sort_by(|a, b| {
            let row_a = (a.origin.1 / 20.0) as i32;
            let row_b = (b.origin.1 / 20.0) as i32;
            row_a.cmp(&row_b).then_with(|| {
                a.origin
                    .0
                    .partial_cmp(&b.origin.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        Ok(lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl OcrBridge for OnnxBridge {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, source: &DocumentSource) -> Result<TextCorpus, OcrError> {
        let start = Instant::now();
        let images = self.rasterizer.rasterize(source)?;

        let mut pages = Vec::with_capacity(images.pages().len());
        for (i, path) in images.pages().iter().enumerate() {
            let text = image::open(path)
                .map_err(|e| OcrError::Recognition(format!("failed to load page image: {}", e)))
                .and_then(|img| self.recognize_image(&img))
                .unwrap_or_else(|e| {
                    warn!("OCR failed on page {} of {}: {}", i + 1, source.path.display(), e);
                    String::new()
                });
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

/// Top-left corner of a detection polygon.
fn polygon_origin(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}
