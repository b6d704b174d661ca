use std::collections::{HashMap, HashSet};

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::analyses_equivalent;
use crate::model::{MatchedPair, ReconResult, SampleRecord};

/// Reconcile worksheet records against document records.
///
/// Records are joined on their normalized sample code. Document records are
/// processed in order; a key billed more than once yields one pair and the
/// later occurrences land in `document_duplicates`. When the worksheet
/// repeats a key, the last row for that key is the one compared; every
/// row of an unbilled key is reported in `worksheet_only`.
pub fn reconcile(
    worksheet: &[SampleRecord],
    document: &[SampleRecord],
    config: &ReconConfig,
) -> Result<ReconResult, ReconError> {
    if worksheet.is_empty() {
        return Err(ReconError::Precondition("worksheet has no records".into()));
    }
    if document.is_empty() {
        return Err(ReconError::Precondition("document has no records".into()));
    }

    let threshold = config.matching.similarity_threshold;
    let lookup = WorksheetIndex::build(worksheet);

    let mut doc_counts: HashMap<&str, usize> = HashMap::new();
    for rec in document {
        *doc_counts.entry(rec.key()).or_insert(0) += 1;
    }

    let mut result = ReconResult::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for doc in document {
        let key = doc.key();
        let repeated = doc_counts.get(key).copied().unwrap_or(0) > 1;

        if repeated && seen.contains(key) {
            result.document_duplicates.push(doc.clone());
            continue;
        }
        seen.insert(key);

        let Some(ws) = lookup.get(key) else {
            result.document_only.push(doc.clone());
            continue;
        };

        let pair = MatchedPair {
            worksheet: ws.clone(),
            document: doc.clone(),
            eix_code_matches: ws.eix_code == doc.eix_code,
            analysis_matches: analyses_equivalent(&ws.analysis, &doc.analysis, threshold),
        };
        if pair.is_exact() {
            result.exact_matches.push(pair);
        } else {
            log::debug!(
                "partial match {}: eix {} analysis {}",
                ws.sample_code(),
                if pair.eix_code_matches { "ok" } else { "differs" },
                if pair.analysis_matches { "ok" } else { "differs" },
            );
            result.partial_matches.push(pair);
        }
    }

    for ws in worksheet {
        if !doc_counts.contains_key(ws.key()) {
            result.worksheet_only.push(ws.clone());
        }
    }

    log::info!(
        "reconciled: {} exact, {} partial, {} worksheet-only, {} document-only, {} duplicate",
        result.exact_matches.len(),
        result.partial_matches.len(),
        result.worksheet_only.len(),
        result.document_only.len(),
        result.document_duplicates.len(),
    );

    Ok(result)
}

/// Worksheet lookup keyed by normalized code. A repeated key resolves to
/// its last row.
struct WorksheetIndex<'a> {
    by_key: HashMap<&'a str, &'a SampleRecord>,
}

impl<'a> WorksheetIndex<'a> {
    fn build(records: &'a [SampleRecord]) -> Self {
        let mut by_key: HashMap<&str, &SampleRecord> = HashMap::new();

        for rec in records {
            if let Some(previous) = by_key.insert(rec.key(), rec) {
                log::warn!(
                    "worksheet repeats sample {} (row {} replaced by row {})",
                    rec.sample_code(),
                    previous.source_line,
                    rec.source_line,
                );
            }
        }

        Self { by_key }
    }

    fn get(&self, key: &str) -> Option<&'a SampleRecord> {
        self.by_key.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(code: &str, eix: &str, analysis: &str) -> SampleRecord {
        SampleRecord::new(code).with_eix_code(eix).with_analysis(analysis)
    }

    fn run(ws: &[SampleRecord], doc: &[SampleRecord]) -> ReconResult {
        reconcile(ws, doc, &ReconConfig::default()).unwrap()
    }

    #[test]
    fn exact_match() {
        let r = run(
            &[rec("00000001", "M-25-0001", "Metals panel")],
            &[rec("00000001", "M-25-0001", "metals panel")],
        );
        assert_eq!(r.exact_matches.len(), 1);
        assert!(r.partial_matches.is_empty());
        assert!(r.worksheet_only.is_empty());
        assert!(r.document_only.is_empty());
    }

    #[test]
    fn eix_mismatch_is_partial() {
        let r = run(
            &[rec("00000001", "M-25-0001", "Metals")],
            &[rec("00000001", "M-25-0002", "Metals")],
        );
        assert_eq!(r.partial_matches.len(), 1);
        let pair = &r.partial_matches[0];
        assert!(!pair.eix_code_matches);
        assert!(pair.analysis_matches);
    }

    #[test]
    fn analysis_mismatch_is_partial() {
        let r = run(
            &[rec("00000001", "M-25-0001", "Metals panel")],
            &[rec("00000001", "M-25-0001", "Microbiology")],
        );
        assert_eq!(r.partial_matches.len(), 1);
        assert!(r.partial_matches[0].eix_code_matches);
        assert!(!r.partial_matches[0].analysis_matches);
    }

    #[test]
    fn empty_analyses_are_never_equivalent() {
        let r = run(&[rec("00000001", "M-25-0001", "")], &[rec("00000001", "M-25-0001", "")]);
        assert_eq!(r.partial_matches.len(), 1);
    }

    #[test]
    fn join_uses_normalized_key() {
        let r = run(
            &[rec("0000-0001", "M-25-0001", "Metals")],
            &[rec("00000001", "M-25-0001", "Metals")],
        );
        assert_eq!(r.exact_matches.len(), 1);
        assert_eq!(r.exact_matches[0].worksheet.sample_code(), "0000-0001");
    }

    #[test]
    fn one_sided_records() {
        let r = run(
            &[rec("00000001", "", "A"), rec("00000002", "", "B")],
            &[rec("00000002", "", "B"), rec("00000003", "", "C")],
        );
        assert_eq!(r.worksheet_only.len(), 1);
        assert_eq!(r.worksheet_only[0].key(), "00000001");
        assert_eq!(r.document_only.len(), 1);
        assert_eq!(r.document_only[0].key(), "00000003");
    }

    #[test]
    fn three_document_copies_yield_two_duplicates() {
        let doc = vec![
            rec("00000001", "M-25-0001", "Metals").at_line(1),
            rec("00000001", "M-25-0001", "Metals").at_line(5),
            rec("00000001", "M-25-0001", "Metals").at_line(9),
        ];
        let r = run(&[rec("00000001", "M-25-0001", "Metals")], &doc);
        assert_eq!(r.exact_matches.len(), 1);
        assert_eq!(r.exact_matches[0].document.source_line, 1);
        let dup_lines: Vec<_> = r.document_duplicates.iter().map(|d| d.source_line).collect();
        assert_eq!(dup_lines, [5, 9]);
    }

    #[test]
    fn duplicated_unknown_key_goes_to_document_only_once() {
        let r = run(
            &[rec("00000009", "", "X")],
            &[rec("00000001", "", "A"), rec("00000001", "", "A")],
        );
        assert_eq!(r.document_only.len(), 1);
        assert_eq!(r.document_duplicates.len(), 1);
    }

    #[test]
    fn last_worksheet_row_wins() {
        let ws = vec![
            rec("00000001", "M-25-0001", "Metals").at_line(2),
            rec("00000001", "M-25-0009", "Metals").at_line(3),
        ];
        let r = run(&ws, &[rec("00000001", "M-25-0009", "Metals")]);
        assert_eq!(r.exact_matches.len(), 1);
        assert_eq!(r.exact_matches[0].worksheet.source_line, 3);
    }

    #[test]
    fn worksheet_only_lists_every_unbilled_row_in_order() {
        let ws = vec![
            rec("00000002", "", "first").at_line(2),
            rec("00000001", "", "").at_line(3),
            rec("00000002", "", "second").at_line(4),
        ];
        let r = run(&ws, &[rec("00000009", "", "x")]);
        let got: Vec<_> = r.worksheet_only.iter().map(|w| (w.key(), w.source_line)).collect();
        assert_eq!(got, [("00000002", 2), ("00000001", 3), ("00000002", 4)]);
    }

    #[test]
    fn repeated_unbilled_key_keeps_both_rows() {
        let ws = vec![
            rec("00000002", "M-25-0002", "Metals").at_line(2),
            rec("00000002", "M-25-0002", "Metals").at_line(3),
        ];
        let r = run(&ws, &[rec("00000009", "", "x")]);
        let lines: Vec<_> = r.worksheet_only.iter().map(|w| w.source_line).collect();
        assert_eq!(lines, [2, 3]);
    }

    #[test]
    fn repeated_billed_key_pairs_once_with_last_row() {
        let ws = vec![
            rec("00000001", "M-25-0001", "Metals").at_line(2),
            rec("00000001", "M-25-0001", "Metals").at_line(3),
        ];
        let r = run(&ws, &[rec("00000001", "M-25-0001", "Metals")]);
        assert_eq!(r.exact_matches.len(), 1);
        assert_eq!(r.exact_matches[0].worksheet.source_line, 3);
        assert!(r.worksheet_only.is_empty());
    }

    #[test]
    fn document_order_is_preserved() {
        let ws = vec![rec("00000001", "", "A"), rec("00000002", "", "B")];
        let doc = vec![rec("00000002", "", "B"), rec("00000001", "", "A")];
        let r = run(&ws, &doc);
        let keys: Vec<_> = r.exact_matches.iter().map(|p| p.document.key()).collect();
        assert_eq!(keys, ["00000002", "00000001"]);
    }

    #[test]
    fn threshold_comes_from_config() {
        let mut config = ReconConfig::default();
        config.matching.similarity_threshold = 0.95;
        let ws = [rec("00000001", "M", "Metals panel")];
        let doc = [rec("00000001", "M", "Metal panels")];
        let strict = reconcile(&ws, &doc, &config).unwrap();
        assert_eq!(strict.partial_matches.len(), 1);
        let lenient = reconcile(&ws, &doc, &ReconConfig::default()).unwrap();
        assert_eq!(lenient.exact_matches.len(), 1);
    }

    #[test]
    fn empty_inputs_are_precondition_errors() {
        let one = [rec("00000001", "", "A")];
        let cfg = ReconConfig::default();
        assert!(matches!(reconcile(&[], &one, &cfg), Err(ReconError::Precondition(_))));
        assert!(matches!(reconcile(&one, &[], &cfg), Err(ReconError::Precondition(_))));
    }
}
