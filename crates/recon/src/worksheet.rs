//! Turn a worksheet cell grid into sample records.
//!
//! The header row is not always the first row: exported worksheets often
//! carry a title or a blank line above it. The loader scans the leading
//! rows for a recognizable header and treats everything below it as data.

use crate::config::{HeaderTokens, WorksheetConfig};
use crate::error::ReconError;
use crate::model::{Cell, SampleRecord};

/// Column index per canonical field. Optional fields may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    reference: Option<usize>,
    installation: Option<usize>,
    provenance: Option<usize>,
    sample: usize,
    eix_code: usize,
    analysis: usize,
}

/// Load records from the rows of the first sheet.
pub fn load_worksheet(grid: &[Vec<Cell>], config: &WorksheetConfig) -> Result<Vec<SampleRecord>, ReconError> {
    let tokens = &config.headers;

    let header_idx = find_header_row(grid, config.header_scan_rows, tokens).ok_or_else(|| {
        ReconError::Format(format!(
            "no header row found in the first {} row(s); expected a '{}' or '{}' column",
            config.header_scan_rows,
            first_token(&tokens.sample),
            first_token(&tokens.reference),
        ))
    })?;
    log::debug!("worksheet header at row {}", header_idx + 1);

    let columns = map_columns(&grid[header_idx], tokens)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (offset, row) in grid[header_idx + 1..].iter().enumerate() {
        if row.iter().all(|c| cell_text(Some(c)).is_empty()) {
            skipped += 1;
            continue;
        }

        let field = |col: Option<usize>| col.map(|c| cell_text(row.get(c))).unwrap_or_default();

        let record = SampleRecord::new(cell_text(row.get(columns.sample)))
            .with_eix_code(cell_text(row.get(columns.eix_code)))
            .with_analysis(cell_text(row.get(columns.analysis)))
            .with_reference(field(columns.reference))
            .with_installation(field(columns.installation))
            .with_provenance(field(columns.provenance))
            .at_line(header_idx + offset + 2);
        records.push(record);
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} empty worksheet row(s)");
    }
    log::info!("loaded {} worksheet record(s)", records.len());
    Ok(records)
}

fn find_header_row(grid: &[Vec<Cell>], scan_rows: usize, tokens: &HeaderTokens) -> Option<usize> {
    grid.iter().take(scan_rows).position(|row| {
        row.iter().any(|cell| {
            let text = cell_text(Some(cell));
            is_token(&text, &tokens.reference) || is_token(&text, &tokens.sample)
        })
    })
}

fn map_columns(header: &[Cell], tokens: &HeaderTokens) -> Result<ColumnMap, ReconError> {
    let find = |candidates: &[String]| {
        header
            .iter()
            .position(|cell| is_token(&cell_text(Some(cell)), candidates))
    };
    let require = |candidates: &[String]| {
        find(candidates).ok_or_else(|| {
            ReconError::Format(format!("missing mandatory column '{}'", first_token(candidates)))
        })
    };

    Ok(ColumnMap {
        reference: find(&tokens.reference),
        installation: find(&tokens.installation),
        provenance: find(&tokens.provenance),
        sample: require(&tokens.sample)?,
        eix_code: require(&tokens.eix_code)?,
        analysis: require(&tokens.analysis)?,
    })
}

fn is_token(text: &str, candidates: &[String]) -> bool {
    !text.is_empty() && candidates.iter().any(|t| t.trim() == text)
}

fn first_token(candidates: &[String]) -> &str {
    candidates.first().map(String::as_str).unwrap_or("?")
}

/// Trimmed cell text; missing cells read as empty.
fn cell_text(cell: Option<&Cell>) -> String {
    cell.and_then(|c| c.as_deref()).map(str::trim).unwrap_or_default().to_string()
}
