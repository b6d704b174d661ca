// Excel/ODS worksheet import (first sheet only)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};

use sampleaudit_recon::Cell;

use crate::error::IoError;

/// Read the first sheet of a workbook (xlsx, xlsm, xls, xlsb, ods) into a
/// cell grid. Row and column positions match the sheet, so the grid starts
/// at A1 even when the used range does not.
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<Cell>>, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::open(path, e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IoError::read(path, "workbook contains no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IoError::read(path, format!("sheet '{sheet_name}': {e}")))?;

    log::debug!("{}: reading sheet '{}' ({:?})", path.display(), sheet_name, range.get_size());

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells: Vec<Cell> = vec![None; start_col as usize];
        cells.extend(row.iter().map(cell_text));
        grid.push(cells);
    }

    Ok(grid)
}

/// Text of one cell. Integral numbers drop the trailing `.0` so a sample
/// code typed as a number reads back as the same digits.
fn cell_text(cell: &Data) -> Cell {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => format_number(*n),
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => format_number(dt.as_f64()),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
