//! `saudit extract` / `saudit load`: show what each side yields on its own.

use std::io;
use std::path::PathBuf;

use sampleaudit_io::csv::write_records;
use sampleaudit_io::{load_worksheet_file, read_document_text, write_records_file};
use sampleaudit_recon::{Extractor, SampleRecord};

use crate::settings::Settings;
use crate::CliError;

pub fn cmd_extract(invoice: PathBuf, out: Option<PathBuf>, json: bool, settings: &Settings) -> Result<(), CliError> {
    let extractor = Extractor::new(&settings.config.extract)?;
    let text = read_document_text(&invoice)?;
    let records = extractor.extract(&text)?;
    eprintln!("Extracted {} record(s) from {}", records.len(), invoice.display());
    emit(&records, out, json)
}

pub fn cmd_load(worksheet: PathBuf, out: Option<PathBuf>, json: bool, settings: &Settings) -> Result<(), CliError> {
    let records = load_worksheet_file(&worksheet, &settings.config.worksheet)?;
    eprintln!("Loaded {} record(s) from {}", records.len(), worksheet.display());
    emit(&records, out, json)
}

/// Records to `out` as CSV, or to stdout as CSV or JSON.
fn emit(records: &[SampleRecord], out: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    if let Some(path) = out {
        if json {
            return Err(CliError::args("--json and --out cannot be combined")
                .with_hint("--out always writes CSV; drop --json or redirect stdout"));
        }
        write_records_file(records, &path)?;
        eprintln!("wrote {}", path.display());
        return Ok(());
    }

    if json {
        let text = serde_json::to_string_pretty(records)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{text}");
        Ok(())
    } else {
        write_records(records, io::stdout().lock())?;
        Ok(())
    }
}
