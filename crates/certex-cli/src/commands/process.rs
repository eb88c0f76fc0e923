//! Process command - extract the date and serial numbers of one document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use certex_core::{ExtractionResult, SheetRecord};

use super::{build_extractor, load_config, process_document, DocumentOptions};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, JPEG, PNG, or extracted text as .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Declared MIME type (application/pdf, image/jpeg, image/png)
    #[arg(long)]
    mime: Option<String>,

    /// CSV file with the document's tables (blank line between tables)
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Always run the OCR pass
    #[arg(long, conflicts_with = "no_ocr")]
    force_ocr: bool,

    /// Never run OCR, even when the digital pass is incomplete
    #[arg(long)]
    no_ocr: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV record row
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Extracting {}", args.input.display()));

    let extractor = build_extractor(&config, args.no_ocr);
    let options = DocumentOptions {
        mime: args.mime.clone(),
        tables: args.tables.clone(),
        force_ocr: args.force_ocr,
    };
    let result = process_document(&extractor, &args.input, &options)?;

    pb.finish_and_clear();

    let file_name = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let output = format_result(&result, file_name, &args.input.display().to_string(), args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_result(
    result: &ExtractionResult,
    file_name: &str,
    link: &str,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(&SheetRecord::new(file_name, link, result)),
        OutputFormat::Text => Ok(format_text(result, file_name)),
    }
}

fn format_csv(record: &SheetRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.serialize(record)?;
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

pub(crate) fn format_text(result: &ExtractionResult, file_name: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", file_name));
    output.push_str(&format!(
        "Date: {}\n",
        result.date.as_deref().unwrap_or("-")
    ));

    if result.serial_numbers.is_empty() {
        output.push_str("Serial Numbers: -\n");
    } else {
        output.push_str("Serial Numbers:\n");
        for serial in &result.serial_numbers {
            output.push_str(&format!("  {}\n", serial));
        }
    }

    output.push_str(&format!("Method: {}\n", result.method));
    output
}
