//! CLI sub-commands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod search;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use certex_core::{
    bridge_from_config, read_document, read_text_file, CertexConfig, DocumentInput,
    DocumentKind, DocumentSource, ExtractionResult, HybridExtractor, TableGrid, TextCorpus,
};

/// `<config dir>/certex/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("certex")
        .join("config.json")
}

/// Explicit config file, else the default location if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CertexConfig> {
    if let Some(path) = config_path {
        return Ok(CertexConfig::from_file(Path::new(path))?);
    }
    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        return Ok(CertexConfig::from_file(&default_path)?);
    }
    Ok(CertexConfig::default())
}

/// Engine with the configured OCR bridge attached, unless OCR is disabled.
pub fn build_extractor(config: &CertexConfig, no_ocr: bool) -> HybridExtractor {
    let extractor = HybridExtractor::new(&config.extraction);
    if no_ocr {
        return extractor;
    }
    match bridge_from_config(&config.ocr) {
        Ok(bridge) => extractor.with_bridge(bridge),
        Err(e) => {
            warn!("OCR disabled: {}", e);
            extractor
        }
    }
}

/// Options applied to every document of a run.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    /// Declared MIME type overriding the extension.
    pub mime: Option<String>,
    /// CSV sidecar with the document's tables.
    pub tables: Option<PathBuf>,
    pub force_ocr: bool,
}

/// Assemble the engine input for one file.
///
/// `.txt` files are an already-extracted corpus. An unreadable PDF yields
/// an empty corpus so the OCR path can still run.
pub fn document_input(path: &Path, options: &DocumentOptions) -> anyhow::Result<DocumentInput> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let mut input = DocumentInput::new().with_force_ocr(options.force_ocr);

    if let Some(tables) = &options.tables {
        input = input.with_tables(read_tables(tables)?);
    }

    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
    if is_text && options.mime.is_none() {
        return Ok(input.with_corpus(read_text_file(path)?));
    }

    let source = match options.mime.as_deref() {
        Some(mime) => {
            let kind = DocumentKind::from_mime(mime)
                .ok_or_else(|| anyhow::anyhow!("Unsupported MIME type: {}", mime))?;
            DocumentSource::new(path, kind)
        }
        None => DocumentSource::from_path(path)?,
    };

    let corpus = read_document(&source).unwrap_or_else(|e| {
        warn!("Unreadable document {}: {}", path.display(), e);
        TextCorpus::default()
    });

    Ok(input.with_corpus(corpus).with_source(source))
}

/// Run the engine on one file.
pub fn process_document(
    extractor: &HybridExtractor,
    path: &Path,
    options: &DocumentOptions,
) -> anyhow::Result<ExtractionResult> {
    let input = document_input(path, options)?;
    Ok(extractor.extract(&input)?)
}

/// Tables from a CSV sidecar; blank lines separate tables.
pub fn read_tables(path: &Path) -> anyhow::Result<TableGrid> {
    let content = fs::read_to_string(path)?;
    let normalized = content.replace("\r\n", "\n");

    let mut tables = Vec::new();
    for block in normalized.split("\n\n").filter(|b| !b.trim().is_empty()) {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(block.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }
        tables.push(rows);
    }

    Ok(TableGrid::new(tables))
}
