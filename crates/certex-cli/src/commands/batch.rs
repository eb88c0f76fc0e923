//! Batch processing command for multiple certificate files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use certex_core::{
    ExtractionMethod, ExtractionResult, HybridExtractor, RecordBook, SheetRecord,
};

use super::process::{format_text, OutputFormat};
use super::{build_extractor, load_config, process_document, DocumentOptions};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Append results to a CSV record book (skips links already present)
    #[arg(long, value_name = "CSV")]
    summary: Option<PathBuf>,

    /// Documents processed in parallel (default: ocr.workers or CPU cores)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Always run the OCR pass
    #[arg(long, conflicts_with = "no_ocr")]
    force_ocr: bool,

    /// Never run OCR
    #[arg(long)]
    no_ocr: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    /// A failed document still yields a row.
    fn record(&self) -> SheetRecord {
        let failed = ExtractionResult {
            date: None,
            serial_numbers: Vec::new(),
            method: ExtractionMethod::OcrFailed,
        };
        SheetRecord::new(
            file_name(&self.path),
            link_for(&self.path),
            self.result.as_ref().unwrap_or(&failed),
        )
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "png" | "jpg" | "jpeg" | "txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let mut book = match &args.summary {
        Some(path) if path.exists() => read_records(path)?,
        _ => RecordBook::new(),
    };
    let before = files.len();
    files.retain(|p| !book.contains_link(&link_for(p)));
    if files.len() < before {
        println!(
            "{} Skipping {} files already in the record book",
            style("ℹ").blue(),
            before - files.len()
        );
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // OCR is CPU-bound: bound in-flight documents and keep them off the reactor.
    let jobs = args.jobs.unwrap_or_else(|| config.ocr.worker_count()).max(1);
    debug!("Processing with {} workers", jobs);

    let extractor: Arc<HybridExtractor> = Arc::new(build_extractor(&config, args.no_ocr));
    let semaphore = Arc::new(Semaphore::new(jobs));
    let options = Arc::new(DocumentOptions {
        force_ocr: args.force_ocr,
        ..Default::default()
    });

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let extractor = extractor.clone();
        let semaphore = semaphore.clone();
        let options = options.clone();
        let pb = overall_pb.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let result = tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let outcome = process_document(&extractor, &path, &options);
                let processing_time_ms = file_start.elapsed().as_millis() as u64;

                match outcome {
                    Ok(result) => ProcessResult {
                        path,
                        result: Some(result),
                        error: None,
                        processing_time_ms,
                    },
                    Err(e) => {
                        warn!("Failed to process {}: {}", path.display(), e);
                        ProcessResult {
                            path,
                            result: None,
                            error: Some(e.to_string()),
                            processing_time_ms,
                        }
                    }
                }
            })
            .await?;
            pb.inc(1);
            anyhow::Ok(result)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await??);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for result in results.iter() {
            if let Some(extraction) = &result.result {
                write_output(output_dir, &result.path, extraction, args.format)?;
            }
        }
    }

    if let Some(summary_path) = &args.summary {
        for result in &results {
            book.push(result.record());
        }
        write_records(summary_path, &book)?;
        println!(
            "{} Record book written to {} ({} records)",
            style("✓").green(),
            summary_path.display(),
            book.len()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let no_data = results
        .iter()
        .filter(|r| r.result.as_ref().is_some_and(|e| e.method == ExtractionMethod::OcrFailed))
        .count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} extracted, {} without data, {} failed",
        style(results.len() - failed.len() - no_data).green(),
        style(no_data).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {} ({}ms): {}",
                result.path.display(),
                result.processing_time_ms,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

/// Stable document identifier: the canonical path.
fn link_for(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn write_output(
    output_dir: &Path,
    path: &Path,
    result: &ExtractionResult,
    format: OutputFormat,
) -> anyhow::Result<()> {
    // `a.pdf` and `a.txt` map to distinct outputs.
    let name = match file_name(path) {
        name if name.is_empty() => "document".to_string(),
        name => name,
    };

    let (extension, content) = match format {
        OutputFormat::Json => ("json", serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.serialize(SheetRecord::new(file_name(path), link_for(path), result))?;
            ("csv", String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => ("txt", format_text(result, &file_name(path))),
    };

    let output_path = output_dir.join(format!("{}.{}", name, extension));
    fs::write(&output_path, content)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

/// Load a CSV record book.
pub fn read_records(path: &Path) -> anyhow::Result<RecordBook> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize::<SheetRecord>() {
        records.push(record?);
    }
    Ok(RecordBook::from_records(records))
}

fn write_records(path: &Path, book: &RecordBook) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in book.records() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
