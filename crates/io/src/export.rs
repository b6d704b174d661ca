// Result export: per-bucket CSV files and JSON reports

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;

use sampleaudit_recon::{MatchedPair, ReconResult, SampleRecord};

use crate::csv::{record_fields, write_records, RECORD_HEADERS};
use crate::error::IoError;

pub const EXACT_MATCHES_FILE: &str = "exact_matches.csv";
pub const PARTIAL_MATCHES_FILE: &str = "partial_matches.csv";
pub const WORKSHEET_ONLY_FILE: &str = "worksheet_only.csv";
pub const DOCUMENT_ONLY_FILE: &str = "document_only.csv";
pub const DOCUMENT_DUPLICATES_FILE: &str = "document_duplicates.csv";

/// Write one CSV per bucket into `dir` (created if missing). Every bucket
/// gets a file, empty ones with just the header row.
pub fn write_bucket_csvs(result: &ReconResult, dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    std::fs::create_dir_all(dir).map_err(|e| IoError::write(dir, e))?;

    let mut written = Vec::with_capacity(5);

    for (name, pairs) in [
        (EXACT_MATCHES_FILE, &result.exact_matches),
        (PARTIAL_MATCHES_FILE, &result.partial_matches),
    ] {
        let path = dir.join(name);
        write_pairs(pairs, &path)?;
        written.push(path);
    }

    for (name, records) in [
        (WORKSHEET_ONLY_FILE, &result.worksheet_only),
        (DOCUMENT_ONLY_FILE, &result.document_only),
        (DOCUMENT_DUPLICATES_FILE, &result.document_duplicates),
    ] {
        let path = dir.join(name);
        write_records_file(records, &path)?;
        written.push(path);
    }

    log::info!("wrote {} bucket file(s) to {}", written.len(), dir.display());
    Ok(written)
}

/// Flat record CSV at `path`.
pub fn write_records_file(records: &[SampleRecord], path: &Path) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    write_records(records, BufWriter::new(file))
}

fn write_pairs(pairs: &[MatchedPair], path: &Path) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| IoError::write(path, e))?;

    let mut header: Vec<String> = Vec::with_capacity(RECORD_HEADERS.len() * 2 + 2);
    for side in ["worksheet", "document"] {
        header.extend(RECORD_HEADERS.iter().map(|h| format!("{h}_{side}")));
    }
    header.push("eix_code_matches".into());
    header.push("analysis_matches".into());
    writer.write_record(&header)?;

    for pair in pairs {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        row.extend(record_fields(&pair.worksheet));
        row.extend(record_fields(&pair.document));
        row.push(pair.eix_code_matches.to_string());
        row.push(pair.analysis_matches.to_string());
        writer.write_record(&row)?;
    }

    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}

/// Pretty JSON at `path`.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).map_err(|e| IoError::write(path, e))?;
    Ok(())
}
