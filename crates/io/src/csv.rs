// CSV/TSV worksheet import and record export

use std::io::Read;
use std::path::Path;

use sampleaudit_recon::{Cell, SampleRecord};

use crate::error::IoError;

/// Read a delimited worksheet into a cell grid. The delimiter is sniffed.
pub fn read_grid(path: &Path) -> Result<Vec<Vec<Cell>>, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    log::debug!("{}: delimiter {:?}", path.display(), delimiter as char);
    parse_grid(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Worksheets often open with a one-cell title line, so judge the
        // candidate by its widest line rather than the first.
        let target = counts.iter().copied().max().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        // Score: (number of lines with the widest field count) * field_count
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::open(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            log::info!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn parse_grid(content: &str, delimiter: u8) -> Result<Vec<Vec<Cell>>, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Vec<Cell> = record
            .iter()
            .map(|field| if field.is_empty() { None } else { Some(field.to_string()) })
            .collect();
        grid.push(row);
    }

    Ok(grid)
}

/// Column headers for a flat record dump.
pub const RECORD_HEADERS: [&str; 8] = [
    "source_line",
    "reference",
    "installation",
    "provenance",
    "sample_code",
    "sample_code_normalized",
    "eix_code",
    "analysis",
];

pub(crate) fn record_fields(r: &SampleRecord) -> [String; 8] {
    [
        r.source_line.to_string(),
        r.reference.clone(),
        r.installation.clone(),
        r.provenance.clone(),
        r.sample_code().to_string(),
        r.key().to_string(),
        r.eix_code.clone(),
        r.analysis.clone(),
    ]
}

/// Write records as a flat CSV with a header row.
pub fn write_records<W: std::io::Write>(records: &[SampleRecord], out: W) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(RECORD_HEADERS)?;
    for r in records {
        writer.write_record(record_fields(r))?;
    }
    writer.flush().map_err(|e| IoError::Csv(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Mostra;Codi Eix;Anàlisis\n00000001;M-25-0001;Metals\n00000002;M-25-0002;pH\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Mostra,Codi Eix,Anàlisis\n00000001,M-25-0001,Metals\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Mostra\tCodi Eix\tAnàlisis\n00000001\tM-25-0001\tMetals\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_pipe_delimiter() {
        let content = "Mostra|Codi Eix|Anàlisis\n00000001|M-25-0001|Metals\n";
        assert_eq!(sniff_delimiter(content), b'|');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Mostra;Anàlisis;Codi Eix\n00000001;\"Metals, full panel\";M-25-0001\n00000002;\"pH, conductivity\";M-25-0002\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_skips_title_line() {
        let content = "Worksheet October\nMostra;Codi Eix;Anàlisis\n00000001;M-25-0001;Metals\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_read_grid_keeps_empty_cells_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ws.csv");
        fs::write(&path, "Mostra;Codi Eix;Anàlisis\n00000001;;Metals\n").unwrap();

        let grid = read_grid(&path).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1][0].as_deref(), Some("00000001"));
        assert_eq!(grid[1][1], None);
        assert_eq!(grid[1][2].as_deref(), Some("Metals"));
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Anàlisis" with 0xE0 for 'à'
        fs::write(&path, b"Mostra;Codi Eix;An\xe0lisis\n").unwrap();

        let grid = read_grid(&path).unwrap();
        assert_eq!(grid[0][2].as_deref(), Some("Anàlisis"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}Mostra,Codi Eix,Anàlisis\n").unwrap();

        let grid = read_grid(&path).unwrap();
        assert_eq!(grid[0][0].as_deref(), Some("Mostra"));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let err = read_grid(Path::new("/nonexistent/ws.csv")).unwrap_err();
        assert!(matches!(err, IoError::Open { .. }));
    }

    #[test]
    fn test_write_records() {
        let recs = vec![SampleRecord::new("0000-0001")
            .with_eix_code("M-25-0001")
            .with_analysis("Metals, full")
            .at_line(3)];
        let mut out = Vec::new();
        write_records(&recs, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("source_line,reference,installation,provenance,sample_code,sample_code_normalized,eix_code,analysis")
        );
        assert_eq!(lines.next(), Some("3,,,,0000-0001,00000001,M-25-0001,\"Metals, full\""));
    }
}
