// Worksheet file loading: pick a reader by extension

use std::path::Path;

use sampleaudit_recon::config::WorksheetConfig;
use sampleaudit_recon::{load_worksheet, Cell, SampleRecord};

use crate::error::IoError;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv"];

/// Cell grid of the worksheet's first sheet.
pub fn read_worksheet_grid(path: &Path) -> Result<Vec<Vec<Cell>>, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        crate::xlsx::read_first_sheet(path)
    } else if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
        crate::csv::read_grid(path)
    } else {
        Err(IoError::Unsupported(format!(
            "{} (expected one of: {}, {})",
            path.display(),
            WORKBOOK_EXTENSIONS.join(", "),
            DELIMITED_EXTENSIONS.join(", "),
        )))
    }
}

/// Read and parse a worksheet file into records.
pub fn load_worksheet_file(path: &Path, config: &WorksheetConfig) -> Result<Vec<SampleRecord>, IoError> {
    let grid = read_worksheet_grid(path)?;
    Ok(load_worksheet(&grid, config)?)
}
