//! Recover sample records from the plain text of a billing document.
//!
//! The invoice layout is irregular: labels may sit one or more lines above
//! the sample line and the secondary code may wrap onto the next line. The
//! extractor therefore looks at each line that carries a sample code
//! together with a bounded window around it:
//!
//! ```text
//! Ref. 4411                        <- lookback (reference)
//! Instal·lació: EDAR Nord          <- lookback (installation)
//! 00000001  M-25-0001 Metals panel <- sample line
//! ```
//!
//! This is a best-effort parser, not a grammar.

use regex::Regex;

use crate::config::{compile_pattern, ExtractConfig};
use crate::error::ReconError;
use crate::model::SampleRecord;

/// Compiled extraction rules. Build once per config, reuse for any number
/// of documents.
#[derive(Debug, Clone)]
pub struct Extractor {
    sample_code: Regex,
    eix_code: Regex,
    reference: Regex,
    reference_label: String,
    installation_labels: Vec<String>,
    lookback: usize,
    lookahead: usize,
}

impl Extractor {
    pub fn new(config: &ExtractConfig) -> Result<Self, ReconError> {
        let sample_code = compile_pattern("extract.sample_code_pattern", &config.sample_code_pattern)?;
        let eix_code = compile_pattern("extract.eix_code_pattern", &config.eix_code_pattern)?;
        let reference = compile_pattern(
            "extract.reference_label",
            &format!(r"{}\s*(\d+)", regex::escape(&config.reference_label)),
        )?;

        Ok(Self {
            sample_code,
            eix_code,
            reference,
            reference_label: config.reference_label.clone(),
            installation_labels: config
                .installation_labels
                .iter()
                .filter(|l| !l.is_empty())
                .cloned()
                .collect(),
            lookback: config.lookback_lines,
            lookahead: config.lookahead_lines,
        })
    }

    /// Extract records from the full document text.
    ///
    /// Fails when the text is blank (nothing was extracted from the
    /// document) or when no line carries a sample code.
    pub fn extract(&self, text: &str) -> Result<Vec<SampleRecord>, ReconError> {
        if text.trim().is_empty() {
            return Err(ReconError::Extraction(
                "document contains no text (scanned or image-only?)".into(),
            ));
        }

        let lines: Vec<&str> = text.lines().collect();
        let records = self.extract_lines(&lines);

        if records.is_empty() {
            return Err(ReconError::Extraction(format!(
                "no sample codes found in {} line(s) of text",
                lines.len()
            )));
        }

        log::info!("extracted {} sample record(s) from {} line(s)", records.len(), lines.len());
        Ok(records)
    }

    /// Single forward pass over `lines`; one record per sample line, in order.
    pub fn extract_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<SampleRecord> {
        let mut records = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let Some((code, code_end)) = self.find_sample_code(line) else {
                continue;
            };

            let eix = self.find_eix_code(lines, i);

            let mut analysis = match eix {
                Some((_, idx, end)) => lines[idx].as_ref()[end..].trim().to_string(),
                None => String::new(),
            };
            if analysis.is_empty() {
                analysis = line[code_end..].trim().to_string();
            }

            let (reference, installation) = self.scan_labels(lines, i);

            let record = SampleRecord::new(code)
                .with_eix_code(eix.map(|(c, _, _)| c).unwrap_or_default())
                .with_analysis(analysis)
                .with_reference(reference)
                .with_installation(installation)
                .at_line(i + 1);

            log::debug!(
                "line {}: sample {} eix '{}' analysis '{}'",
                i + 1,
                record.sample_code(),
                record.eix_code,
                record.analysis
            );
            records.push(record);
        }

        records
    }

    /// First sample code on the line that is not part of a longer digit run.
    fn find_sample_code<'l>(&self, line: &'l str) -> Option<(&'l str, usize)> {
        self.sample_code
            .find_iter(line)
            .find(|m| {
                let before = line[..m.start()].chars().next_back();
                let after = line[m.end()..].chars().next();
                !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
            })
            .map(|m| (m.as_str(), m.end()))
    }

    /// Secondary code on line `i` or within the lookahead window.
    /// Returns (code, line index, byte offset just past the code).
    fn find_eix_code<S: AsRef<str>>(&self, lines: &[S], i: usize) -> Option<(String, usize, usize)> {
        let last = (i + self.lookahead).min(lines.len().saturating_sub(1));
        (i..=last).find_map(|idx| {
            self.eix_code
                .find(lines[idx].as_ref())
                .map(|m| (m.as_str().to_string(), idx, m.end()))
        })
    }

    /// Reference and installation from the lines preceding `i`.
    /// Scanned oldest first, so the nearest label wins.
    fn scan_labels<S: AsRef<str>>(&self, lines: &[S], i: usize) -> (String, String) {
        let mut reference = String::new();
        let mut installation = String::new();

        for line in &lines[i.saturating_sub(self.lookback)..i] {
            let line = line.as_ref();

            if line.contains(&self.reference_label) {
                if let Some(digits) = self.reference.captures(line).and_then(|c| c.get(1)) {
                    reference = digits.as_str().to_string();
                }
            }

            if self.installation_labels.iter().any(|label| line.contains(label.as_str())) {
                installation = line
                    .split_once(':')
                    .map(|(_, rest)| rest.trim().to_string())
                    .unwrap_or_default();
            }
        }

        (reference, installation)
    }
}

/// Extract records with the given config in one call.
pub fn extract_records(text: &str, config: &ExtractConfig) -> Result<Vec<SampleRecord>, ReconError> {
    Extractor::new(config)?.extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::new(&ExtractConfig::default()).unwrap()
    }

    fn run(lines: &[&str]) -> Vec<SampleRecord> {
        extractor().extract_lines(lines)
    }

    #[test]
    fn code_and_analysis_on_one_line() {
        let recs = run(&["00000001 M-25-0001 Metals panel"]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].sample_code(), "00000001");
        assert_eq!(recs[0].key(), "00000001");
        assert_eq!(recs[0].eix_code, "M-25-0001");
        assert_eq!(recs[0].analysis, "Metals panel");
        assert_eq!(recs[0].source_line, 1);
    }

    #[test]
    fn eix_code_on_following_line() {
        let recs = run(&["Sample 00000002", "M-25-0002   pH and conductivity", "unrelated"]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].eix_code, "M-25-0002");
        assert_eq!(recs[0].analysis, "pH and conductivity");
    }

    #[test]
    fn lookahead_is_one_line() {
        let recs = run(&["00000003 Metals", "no code here", "M-25-0003 Metals"]);
        assert_eq!(recs[0].eix_code, "");
        assert_eq!(recs[0].analysis, "Metals");
    }

    #[test]
    fn current_line_code_wins_over_next_line() {
        let recs = run(&["00000004 M-25-0004 VOC", "M-25-9999 Other"]);
        assert_eq!(recs[0].eix_code, "M-25-0004");
        assert_eq!(recs[0].analysis, "VOC");
    }

    #[test]
    fn empty_text_after_eix_falls_back_to_sample_line() {
        // Code found at the end of the line: nothing follows it, so the text
        // after the sample code is used instead.
        let recs = run(&["00000005 Nitrates M-25-0005"]);
        assert_eq!(recs[0].eix_code, "M-25-0005");
        assert_eq!(recs[0].analysis, "Nitrates M-25-0005");
    }

    #[test]
    fn no_eix_falls_back_to_text_after_sample() {
        let recs = run(&["  00000006   Legionella  "]);
        assert_eq!(recs[0].eix_code, "");
        assert_eq!(recs[0].analysis, "Legionella");
    }

    #[test]
    fn lines_without_codes_are_skipped() {
        let recs = run(&["Invoice 2025/17", "Total 1.234,56", "Page 1 of 2"]);
        assert!(recs.is_empty());
    }

    #[test]
    fn longer_digit_runs_do_not_qualify() {
        let recs = run(&["Order 1234567890", "IBAN ES12 0000 0000"]);
        assert!(recs.is_empty());
    }

    #[test]
    fn exact_run_after_longer_run_qualifies() {
        let recs = run(&["1234567890 then 00000007 M-25-0007 Metals"]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].sample_code(), "00000007");
    }

    #[test]
    fn labels_from_lookback_window() {
        let recs = run(&[
            "Ref. 4411",
            "Instal·lació: EDAR Nord",
            "00000008 M-25-0008 Metals",
        ]);
        assert_eq!(recs[0].reference, "4411");
        assert_eq!(recs[0].installation, "EDAR Nord");
    }

    #[test]
    fn labels_outside_window_are_ignored() {
        let recs = run(&[
            "Ref. 4411",
            "filler",
            "filler",
            "filler",
            "00000009 M-25-0009 Metals",
        ]);
        assert_eq!(recs[0].reference, "");
    }

    #[test]
    fn nearest_label_wins() {
        let recs = run(&[
            "Ref. 1000",
            "Ref. 2000",
            "Instalación: Planta Sud",
            "00000010 M-25-0010 Metals",
        ]);
        assert_eq!(recs[0].reference, "2000");
        assert_eq!(recs[0].installation, "Planta Sud");
    }

    #[test]
    fn installation_without_colon_clears_value() {
        let recs = run(&[
            "Instal·lació: EDAR Nord",
            "Instal·lació pendent",
            "00000011 M-25-0011 Metals",
        ]);
        assert_eq!(recs[0].installation, "");
    }

    #[test]
    fn reference_label_without_digits_keeps_previous() {
        let recs = run(&["Ref. 3000", "Ref. pending", "00000012 M-25-0012 Metals"]);
        assert_eq!(recs[0].reference, "3000");
    }

    #[test]
    fn reference_line_can_itself_be_a_sample_line() {
        let recs = run(&["Ref. 12345678", "00000013 M-25-0013 Metals"]);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].sample_code(), "12345678");
        assert_eq!(recs[1].reference, "12345678");
    }

    #[test]
    fn order_follows_text() {
        let recs = run(&["00000020 M-25-0020 A", "00000019 M-25-0019 B", "00000020 M-25-0020 A"]);
        let codes: Vec<_> = recs.iter().map(|r| r.sample_code()).collect();
        assert_eq!(codes, ["00000020", "00000019", "00000020"]);
    }

    #[test]
    fn blank_text_is_an_error() {
        let err = extractor().extract("  \n\n \x0c").unwrap_err();
        assert!(matches!(err, ReconError::Extraction(_)));
    }

    #[test]
    fn text_without_samples_is_an_error() {
        let err = extractor().extract("Invoice\nTotal 10,00 EUR\n").unwrap_err();
        match err {
            ReconError::Extraction(msg) => assert!(msg.contains("2 line(s)")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn crlf_text_is_trimmed() {
        let recs = extractor().extract("00000014 M-25-0014 Metals\r\nfooter\r\n").unwrap();
        assert_eq!(recs[0].analysis, "Metals");
    }

    #[test]
    fn custom_windows_and_patterns() {
        let config = ExtractConfig {
            eix_code_pattern: r"E-\d{3}".into(),
            lookahead_lines: 2,
            lookback_lines: 1,
            ..ExtractConfig::default()
        };
        let ex = Extractor::new(&config).unwrap();
        let recs = ex.extract_lines(&["Ref. 55", "gap", "00000015 Metals", "gap", "E-123 Full metals"]);
        assert_eq!(recs[0].eix_code, "E-123");
        assert_eq!(recs[0].analysis, "Full metals");
        assert_eq!(recs[0].reference, "");
    }
}
