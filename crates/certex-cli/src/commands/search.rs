//! Search command - look up documents in a CSV record book.

use std::path::PathBuf;

use clap::Args;
use console::style;

use certex_core::{SearchQuery, SheetRecord};

use super::batch::read_records;

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Record book written by `batch --summary`
    #[arg(short, long, default_value = "summary.csv")]
    records: PathBuf,

    /// Serial number (case-insensitive, partial match)
    #[arg(short, long)]
    serial: Option<String>,

    /// Date, in any supported format
    #[arg(short, long)]
    date: Option<String>,

    /// Print matches as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: SearchArgs) -> anyhow::Result<()> {
    let mut query = SearchQuery::new();
    if let Some(serial) = &args.serial {
        query = query.with_serial(serial.as_str());
    }
    if let Some(date) = &args.date {
        query = query.with_date(date.as_str());
    }
    if query.is_empty() {
        anyhow::bail!("Provide --serial and/or --date");
    }

    if !args.records.exists() {
        anyhow::bail!("Record book not found: {}", args.records.display());
    }
    let book = read_records(&args.records)?;
    let matches = book.search(&query);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("{} No matches found.", style("ℹ").yellow());
        return Ok(());
    }

    println!(
        "{} Found {} match{}",
        style("✓").green(),
        matches.len(),
        if matches.len() == 1 { "" } else { "es" }
    );
    for record in matches {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &SheetRecord) {
    println!();
    println!("{}", style(&record.file_name).bold());
    println!("  Date:    {}", if record.date.is_empty() { "-" } else { &record.date });
    for (i, serial) in record.serial_number.lines().enumerate() {
        let label = if i == 0 { "Serial:" } else { "" };
        println!("  {:<8} {}", label, serial);
    }
    println!("  Method:  {}", record.method);
    println!("  Link:    {}", record.link);
}
