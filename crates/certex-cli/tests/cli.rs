//! Integration tests for the certex CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workspace with a config whose OCR engine is never installed.
struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        fs::write(
            &config,
            r#"{"ocr": {"tesseract_cmd": "certex-missing-tesseract", "pdftoppm_cmd": "certex-missing-pdftoppm"}}"#,
        )
        .unwrap();
        Self { dir, config }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cli(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_certex"));
        cmd.arg("--config").arg(&self.config);
        cmd
    }
}

#[test]
fn test_help_lists_commands() {
    Command::new(env!("CARGO_BIN_EXE_certex"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn test_process_digital_text() {
    let ws = Workspace::new();
    let input = ws.file(
        "cert.txt",
        "Certificate of Origin\nDate: 2024-01-01\nRef No. A123\n",
    );

    ws.cli()
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("01/01/2024"))
        .stdout(predicate::str::contains("A123"))
        .stdout(predicate::str::contains("\"Regex\""));
}

#[test]
fn test_process_with_table_sidecar() {
    let ws = Workspace::new();
    let input = ws.file("cq.txt", "Certificate of Quality\nIssued 12/05/2023\n");
    let tables = ws.file("cq.csv", "Item,Qty\nSer.No.,C789\n\nNotes\nnone\n");

    ws.cli()
        .arg("process")
        .arg(&input)
        .arg("--tables")
        .arg(&tables)
        .arg("--format")
        .arg("text")
        .assert()
        .success()
        .stdout(predicate::str::contains("C789"))
        .stdout(predicate::str::contains("Date: 12/05/2023"))
        .stdout(predicate::str::contains("Method: Regex"));
}

#[test]
fn test_process_scanned_without_ocr() {
    let ws = Workspace::new();
    let input = ws.file("scan.txt", "x");

    ws.cli()
        .arg("process")
        .arg(&input)
        .arg("--no-ocr")
        .assert()
        .success()
        .stdout(predicate::str::contains("OCR (Tesseract) (Failed)"));
}

#[test]
fn test_process_missing_tesseract_degrades() {
    let ws = Workspace::new();
    let input = ws.file("scan.png", "");

    ws.cli()
        .arg("process")
        .arg(&input)
        .arg("--format")
        .arg("csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("File Name,Date,Serial Number,Method,Link"))
        .stdout(predicate::str::contains("OCR (Tesseract) (Failed)"));
}

#[test]
fn test_process_missing_file() {
    let ws = Workspace::new();

    ws.cli()
        .arg("process")
        .arg(ws.path().join("nope.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_batch_then_search() {
    let ws = Workspace::new();
    ws.file("a.txt", "Date: 2024-01-01\nSerial No. SN-001, SN-002\n");
    ws.file("b.txt", "Date: 12/05/2023\nS/N: SN-999\n");
    let records = ws.path().join("records.csv");
    let pattern = format!("{}/*.txt", ws.path().display());

    ws.cli()
        .arg("batch")
        .arg(&pattern)
        .arg("--summary")
        .arg(&records)
        .arg("-j")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 records"));

    let stored = fs::read_to_string(&records).unwrap();
    assert!(stored.starts_with("File Name,Date,Serial Number,Method,Link"));

    ws.cli()
        .arg("search")
        .arg("--records")
        .arg(&records)
        .arg("--serial")
        .arg("sn-002")
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt"))
        .stdout(predicate::str::contains("b.txt").not());

    ws.cli()
        .arg("search")
        .arg("--records")
        .arg(&records)
        .arg("--date")
        .arg("1/1/2024")
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt"));

    // Re-running skips documents already recorded.
    ws.cli()
        .arg("batch")
        .arg(&pattern)
        .arg("--summary")
        .arg(&records)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping 2 files"))
        .stdout(predicate::str::contains("2 records"));
}

#[test]
fn test_batch_outputs_keep_input_extension() {
    let ws = Workspace::new();
    ws.file("a.txt", "Date: 2024-01-01\nRef No. A123\n");
    ws.file("a.pdf", "not a pdf");
    let out = ws.path().join("out");
    let pattern = format!("{}/a.*", ws.path().display());

    ws.cli()
        .arg("batch")
        .arg(&pattern)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    let text_output = fs::read_to_string(out.join("a.txt.json")).unwrap();
    assert!(text_output.contains("A123"));
    let pdf_output = fs::read_to_string(out.join("a.pdf.json")).unwrap();
    assert!(pdf_output.contains("OCR (Tesseract) (Failed)"));
}

#[test]
fn test_search_requires_criteria() {
    let ws = Workspace::new();

    ws.cli()
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--serial and/or --date"));
}

#[test]
fn test_config_set_and_get() {
    let ws = Workspace::new();

    ws.cli()
        .args(["config", "set", "extraction.image_heavy_threshold", "5"])
        .assert()
        .success();

    ws.cli()
        .args(["config", "get", "extraction.image_heavy_threshold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));

    ws.cli()
        .args(["config", "get", "ocr.tesseract_cmd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("certex-missing-tesseract"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let ws = Workspace::new();

    ws.cli()
        .args(["config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
